//! Panorama site model: floors, georeferenced panorama nodes, points of
//! interest, depth maps, and nearest-node lookup.

mod depth;
mod metadata;
mod node;
mod poi;
pub mod spatial;

pub use depth::{DEPTH_MAP_HEIGHT, DEPTH_MAP_WIDTH, DepthError, DepthMap};
pub use metadata::{MetadataError, NodeRecord, parse_nodes, parse_pois};
pub use node::{Floor, FloorId, FloorMap, Node, NodeId, NodeSet};
pub use poi::{Poi, PoiSet};
pub use spatial::{Spatial, nearest, nearest_by, within_radius};
