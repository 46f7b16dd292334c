//! Points of interest.

use std::collections::BTreeMap;

use vista_geo::GeoPoint;

/// A point of interest, read-only after parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct Poi {
    pub id: i64,
    /// Coordinate list as given in the metadata, normally `[lon, lat, z]`.
    pub coords: Vec<f64>,
}

impl Poi {
    /// The coordinate as a georeferenced point, if it has exactly three entries.
    pub fn position(&self) -> Option<GeoPoint> {
        match self.coords[..] {
            [lon, lat, z] => Some(GeoPoint::new(lon, lat, z)),
            _ => None,
        }
    }
}

/// POIs keyed by id, iterated in ascending id order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoiSet {
    pois: BTreeMap<i64, Poi>,
}

impl PoiSet {
    pub(crate) fn from_map(pois: BTreeMap<i64, Poi>) -> Self {
        Self { pois }
    }

    pub fn get(&self, id: i64) -> Option<&Poi> {
        self.pois.get(&id)
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Poi> {
        self.pois.values()
    }
}
