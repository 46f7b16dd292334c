//! Site-local metric frame.
//!
//! Node metadata is georeferenced (longitude, latitude in degrees, height in
//! metres). The 3D scene works in metres relative to a site origin. Over the
//! extent of a single building the flat-earth approximation with fixed
//! kilometres-per-degree scalars is accurate enough.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A georeferenced point: degrees of longitude/latitude plus height in metres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude in degrees, positive east.
    pub lon: f64,
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Height in metres.
    pub z: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(lon: f64, lat: f64, z: f64) -> Self {
        Self { lon, lat, z }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.7}, {:.7}, {:.2}m)", self.lon, self.lat, self.z)
    }
}

/// Converts between [`GeoPoint`]s and local scene coordinates in metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalFrame {
    origin: GeoPoint,
    metres_per_lon_deg: f64,
    metres_per_lat_deg: f64,
}

impl LocalFrame {
    /// Frame centred on `origin` with the given kilometres-per-degree scalars.
    pub fn new(origin: GeoPoint, lon_scalar_km: f64, lat_scalar_km: f64) -> Self {
        Self {
            origin,
            metres_per_lon_deg: lon_scalar_km * 1000.0,
            metres_per_lat_deg: lat_scalar_km * 1000.0,
        }
    }

    /// The georeferenced point that maps to the local origin.
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Global → local metres.
    pub fn to_local(&self, p: GeoPoint) -> DVec3 {
        DVec3::new(
            (p.lon - self.origin.lon) * self.metres_per_lon_deg,
            (p.lat - self.origin.lat) * self.metres_per_lat_deg,
            p.z - self.origin.z,
        )
    }

    /// Local metres → global.
    pub fn to_global(&self, v: DVec3) -> GeoPoint {
        GeoPoint {
            lon: self.origin.lon + v.x / self.metres_per_lon_deg,
            lat: self.origin.lat + v.y / self.metres_per_lat_deg,
            z: self.origin.z + v.z,
        }
    }

    /// Local height of a global height.
    pub fn local_z(&self, z: f64) -> f64 {
        z - self.origin.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> LocalFrame {
        LocalFrame::new(GeoPoint::new(11.5, 48.1, 500.0), 71.5, 111.3)
    }

    #[test]
    fn test_origin_maps_to_zero() {
        let f = frame();
        assert_eq!(f.to_local(f.origin()), DVec3::ZERO);
    }

    #[test]
    fn test_one_millidegree_east() {
        let local = frame().to_local(GeoPoint::new(11.501, 48.1, 500.0));
        assert!((local.x - 71.5).abs() < 1e-6);
        assert!(local.y.abs() < 1e-9);
    }

    #[test]
    fn test_global_local_roundtrip() {
        let f = frame();
        let p = GeoPoint::new(11.5003, 48.0998, 503.2);
        let back = f.to_global(f.to_local(p));
        assert!((back.lon - p.lon).abs() < 1e-12);
        assert!((back.lat - p.lat).abs() < 1e-12);
        assert!((back.z - p.z).abs() < 1e-9);
    }

    #[test]
    fn test_local_z_is_relative_to_origin() {
        assert_eq!(frame().local_z(503.0), 3.0);
    }
}
