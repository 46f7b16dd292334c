//! Floors and panorama nodes.

use std::collections::HashMap;
use std::fmt;

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use vista_geo::{GeoPoint, LocalFrame};

use crate::metadata::{MetadataError, NodeRecord};
use crate::spatial::{Spatial, within_radius};

/// Identifier of a panorama node, as given in the metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a floor within its [`NodeSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FloorId(pub usize);

/// Floor-plan image placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorMap {
    /// Image name without extension, relative to the base URL.
    pub name: String,
    /// Pixels per metre.
    pub density: f64,
    /// Pixel offset of the site origin from the image's left edge.
    pub x: f64,
    /// Pixel offset of the site origin from the image's bottom edge.
    pub y: f64,
    /// Image width in pixels.
    pub width: f64,
    /// Image height in pixels.
    pub height: f64,
}

impl Default for FloorMap {
    fn default() -> Self {
        Self {
            name: String::new(),
            density: 1.0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

/// A building level.
#[derive(Clone, Debug, PartialEq)]
pub struct Floor {
    pub id: FloorId,
    pub name: String,
    /// Global height of the floor surface in metres.
    pub z: f64,
    pub map: FloorMap,
}

/// A panorama capture point. Immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Position in the local metric frame.
    pub position: DVec3,
    /// Georeferenced position, used by the map overlay.
    pub global: GeoPoint,
    /// Rotation of the panorama image.
    pub orientation: DQuat,
    pub floor: FloorId,
    /// `(lonov, latov)` to face when arriving here. `None` keeps the current view.
    pub default_view: Option<(f64, f64)>,
}

impl Spatial for Node {
    fn position(&self) -> DVec3 {
        self.position
    }
}

/// All floors and nodes of a site.
///
/// Nodes are stored in load order and every query iterates in that order,
/// so nearest-node ties resolve to the node loaded first.
#[derive(Clone, Debug)]
pub struct NodeSet {
    frame: LocalFrame,
    floors: Vec<Floor>,
    nodes: Vec<Node>,
    by_id: HashMap<NodeId, usize>,
}

impl NodeSet {
    /// Empty site using `frame` for global ↔ local conversion.
    pub fn new(frame: LocalFrame) -> Self {
        Self {
            frame,
            floors: Vec::new(),
            nodes: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// The site's local frame.
    pub fn frame(&self) -> &LocalFrame {
        &self.frame
    }

    /// Register a floor. Floors are indexed in registration order.
    pub fn add_floor(&mut self, name: impl Into<String>, z: f64, map: FloorMap) -> FloorId {
        let id = FloorId(self.floors.len());
        self.floors.push(Floor {
            id,
            name: name.into(),
            z,
            map,
        });
        id
    }

    /// Add parsed node records to a floor. Rejects ids already present
    /// anywhere in the set; nothing is added on error.
    pub fn add_nodes(&mut self, floor: FloorId, records: &[NodeRecord]) -> Result<(), MetadataError> {
        for (record, r) in records.iter().enumerate() {
            if self.by_id.contains_key(&r.id)
                || records[..record].iter().any(|other| other.id == r.id)
            {
                return Err(MetadataError::DuplicateId {
                    record,
                    id: i64::from(r.id.0),
                });
            }
        }
        for r in records {
            self.by_id.insert(r.id, self.nodes.len());
            self.nodes.push(Node {
                id: r.id,
                position: self.frame.to_local(r.position),
                global: r.position,
                orientation: r.orientation,
                floor,
                default_view: None,
            });
        }
        tracing::debug!(floor = floor.0, count = records.len(), "added nodes");
        Ok(())
    }

    /// Give a node a default orientation applied on arrival.
    pub fn set_default_view(&mut self, id: NodeId, lonov: f64, latov: f64) -> bool {
        match self.by_id.get(&id) {
            Some(&idx) => {
                self.nodes[idx].default_view = Some((lonov, latov));
                true
            }
            None => false,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.by_id.get(&id).map(|&idx| &self.nodes[idx])
    }

    pub fn floor(&self, id: FloorId) -> Option<&Floor> {
        self.floors.get(id.0)
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    /// All nodes in load order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes of one floor in load order.
    pub fn nodes_on_floor(&self, floor: FloorId) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.floor == floor)
    }

    /// Nodes within `radius` metres of `center` (3D distance), in load order.
    pub fn nodes_in_sphere(&self, center: DVec3, radius: f64) -> Vec<&Node> {
        within_radius(center, radius, &self.nodes).collect()
    }

    /// The floor a global height belongs to: the highest floor whose surface
    /// is at or below `z`, or the lowest floor when `z` is below all of them.
    pub fn floor_for_height(&self, z: f64) -> Option<FloorId> {
        let below = self
            .floors
            .iter()
            .filter(|f| f.z <= z)
            .max_by(|a, b| a.z.total_cmp(&b.z));
        below
            .or_else(|| self.floors.iter().min_by(|a, b| a.z.total_cmp(&b.z)))
            .map(|f| f.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(name: &str) -> FloorMap {
        FloorMap {
            name: name.to_string(),
            density: 0.05,
            x: 100.0,
            y: 100.0,
            width: 800.0,
            height: 600.0,
        }
    }

    fn record(id: u32, lon: f64, lat: f64, z: f64) -> NodeRecord {
        NodeRecord {
            id: NodeId(id),
            position: GeoPoint::new(lon, lat, z),
            orientation: DQuat::IDENTITY,
        }
    }

    fn site() -> NodeSet {
        let frame = LocalFrame::new(GeoPoint::new(11.0, 48.0, 500.0), 71.5, 111.3);
        let mut set = NodeSet::new(frame);
        let ground = set.add_floor("EG", 500.0, plan("eg"));
        let first = set.add_floor("OG1", 504.0, plan("og1"));
        set.add_nodes(
            ground,
            &[record(1, 11.0, 48.0, 501.5), record(2, 11.0001, 48.0, 501.5)],
        )
        .unwrap();
        set.add_nodes(first, &[record(3, 11.0, 48.0, 505.5)]).unwrap();
        set
    }

    #[test]
    fn test_nodes_get_local_positions() {
        let set = site();
        let n2 = set.node(NodeId(2)).unwrap();
        assert!((n2.position.x - 7.15).abs() < 1e-6);
        assert!((n2.position.z - 1.5).abs() < 1e-9);
        assert_eq!(n2.global.lon, 11.0001);
    }

    #[test]
    fn test_duplicate_id_rejected_without_partial_insert() {
        let mut set = site();
        let err = set
            .add_nodes(FloorId(0), &[record(9, 11.0, 48.0, 501.0), record(1, 11.0, 48.0, 501.0)])
            .unwrap_err();
        assert_eq!(err, MetadataError::DuplicateId { record: 1, id: 1 });
        assert!(set.node(NodeId(9)).is_none());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_nodes_on_floor_in_load_order() {
        let set = site();
        let ids: Vec<_> = set.nodes_on_floor(FloorId(0)).map(|n| n.id).collect();
        assert_eq!(ids, vec![NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_nodes_in_sphere_excludes_far_floor() {
        let set = site();
        let near: Vec<_> = set
            .nodes_in_sphere(DVec3::new(0.0, 0.0, 1.5), 3.0)
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(near, vec![NodeId(1)]);
    }

    #[test]
    fn test_floor_for_height() {
        let set = site();
        assert_eq!(set.floor_for_height(501.5), Some(FloorId(0)));
        assert_eq!(set.floor_for_height(505.5), Some(FloorId(1)));
        assert_eq!(set.floor_for_height(100.0), Some(FloorId(0)));
    }

    #[test]
    fn test_default_view_assignment() {
        let mut set = site();
        assert!(set.set_default_view(NodeId(3), 90.0, -10.0));
        assert_eq!(set.node(NodeId(3)).unwrap().default_view, Some((90.0, -10.0)));
        assert!(!set.set_default_view(NodeId(42), 0.0, 0.0));
    }
}
