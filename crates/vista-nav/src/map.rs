//! Keeps the 2D map in step with the panorama: floor-plan visibility, node
//! markers, the current position and the field-of-view cone.

use glam::DVec2;
use vista_geo::{GeoPoint, from_lon_lat, horizontal_heading};
use vista_scene::{FloorMap, Node, NodeSet};

use crate::adapter::{MapAdapter, MarkerId, MarkerStyle};
use crate::view_state::ViewState;

/// Degrees of longitude/latitude per unit of cone radius.
const CONE_UNIT_DEG: f64 = 5e-6;

/// Floor-plan images are stretched by this factor when placed on the map.
const FLOOR_IMAGE_SCALE: f64 = 1.5;

/// Triangle `[apex, left, right]` showing the horizontal field of view.
///
/// The cone is centred on the camera heading (east is +lon, north is +lat)
/// and grows with the field of view so that zooming in shortens it.
pub fn cone_vertices(apex: DVec2, view: &ViewState, scaling_map: f64) -> [DVec2; 3] {
    let axis = horizontal_heading(view.lonov()).truncate();
    let half = (view.fov() / 2.0).to_radians();
    let radius = view.fov() / (view.limits().max_fov * scaling_map) * CONE_UNIT_DEG;
    let vertex = |angle: f64| apex + radius * DVec2::from_angle(angle).rotate(axis);
    [apex, vertex(half), vertex(-half)]
}

/// Placement `[left, bottom, right, top]` of a floor-plan image in
/// Web-Mercator metres, given the site origin in degrees.
pub fn floor_image_extent(map: &FloorMap, origin: GeoPoint) -> [f64; 4] {
    let origin = from_lon_lat(origin.lon, origin.lat);
    let left = origin.x - (map.x / map.density) * FLOOR_IMAGE_SCALE;
    let right = left + (map.width / map.density) * FLOOR_IMAGE_SCALE;
    let bottom = origin.y - (map.y / map.density) * FLOOR_IMAGE_SCALE;
    let top = bottom + (map.height / map.density) * FLOOR_IMAGE_SCALE;
    [left, bottom, right, top]
}

fn lon_lat(p: GeoPoint) -> DVec2 {
    DVec2::new(p.lon, p.lat)
}

/// Owns the map adapter and the features drawn on it.
#[derive(Debug)]
pub struct MapOverlay<M> {
    adapter: M,
    scaling_map: f64,
    position: Option<GeoPoint>,
    node_markers: Vec<MarkerId>,
    current_marker: Option<MarkerId>,
    cone: Option<MarkerId>,
}

impl<M: MapAdapter> MapOverlay<M> {
    pub fn new(adapter: M, scaling_map: f64) -> Self {
        Self {
            adapter,
            scaling_map,
            position: None,
            node_markers: Vec::new(),
            current_marker: None,
            cone: None,
        }
    }

    pub fn adapter(&self) -> &M {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut M {
        &mut self.adapter
    }

    /// Global position of the current marker.
    pub fn position(&self) -> Option<GeoPoint> {
        self.position
    }

    /// Redraw everything for `node`: its floor's plan and nodes, the current
    /// marker, the map centre and the viewing cone.
    pub fn redraw(&mut self, nodes: &NodeSet, node: &Node, view: &ViewState) {
        for floor in nodes.floors() {
            self.adapter.set_floor_visible(floor.id, floor.id == node.floor);
        }

        for marker in self.node_markers.drain(..) {
            self.adapter.remove_marker(marker);
        }
        for other in nodes.nodes_on_floor(node.floor) {
            let marker = self.adapter.add_marker(lon_lat(other.global), MarkerStyle::NODE);
            self.node_markers.push(marker);
        }

        if let Some(marker) = self.current_marker.take() {
            self.adapter.remove_marker(marker);
        }
        let here = lon_lat(node.global);
        self.current_marker = Some(self.adapter.add_marker(here, MarkerStyle::CURRENT));
        self.adapter.set_center(here);
        self.position = Some(node.global);

        self.show_direction(view);
    }

    /// Replace the viewing cone. No-op before the first [`redraw`](Self::redraw).
    pub fn show_direction(&mut self, view: &ViewState) {
        let Some(position) = self.position else {
            return;
        };
        if let Some(cone) = self.cone.take() {
            self.adapter.remove_marker(cone);
        }
        let vertices = cone_vertices(lon_lat(position), view, self.scaling_map);
        self.cone = Some(self.adapter.set_polygon(&vertices, MarkerStyle::VIEW_CONE));
        self.adapter.redraw();
    }

    pub fn zoom_in(&mut self) {
        let zoom = self.adapter.zoom();
        self.adapter.set_zoom(zoom + 1.0);
    }

    pub fn zoom_out(&mut self) {
        let zoom = self.adapter.zoom();
        self.adapter.set_zoom(zoom - 1.0);
    }
}

#[cfg(test)]
mod tests {
    use glam::DQuat;
    use vista_geo::LocalFrame;
    use vista_scene::{NodeId, NodeRecord};

    use super::*;
    use crate::recording::RecordingMap;

    fn floor_map() -> FloorMap {
        FloorMap {
            name: "eg".into(),
            density: 0.5,
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
        }
    }

    fn site() -> NodeSet {
        let origin = GeoPoint::new(11.0, 48.0, 500.0);
        let mut nodes = NodeSet::new(LocalFrame::new(origin, 71.5, 111.3));
        let ground = nodes.add_floor("eg", 500.0, floor_map());
        let upper = nodes.add_floor("og", 504.0, floor_map());
        let record = |id, lon, z| NodeRecord {
            id: NodeId(id),
            position: GeoPoint::new(lon, 48.0, z),
            orientation: DQuat::IDENTITY,
        };
        nodes
            .add_nodes(ground, &[record(1, 11.0, 501.5), record(2, 11.0001, 501.5)])
            .unwrap();
        nodes.add_nodes(upper, &[record(3, 11.0, 505.5)]).unwrap();
        nodes
    }

    #[test]
    fn test_cone_follows_lonov() {
        let mut view = ViewState::default();
        view.set_fov(100.0);
        let apex = DVec2::new(11.0, 48.0);

        let [a, left, right] = cone_vertices(apex, &view, 0.1);
        assert_eq!(a, apex);
        // fov 100 at max 100 with scaling 0.1 gives radius 10 units.
        let r = 10.0 * CONE_UNIT_DEG;
        assert!(((left - apex).length() - r).abs() < 1e-12);
        // lonov 0 looks west: symmetric about -lon.
        assert!(((left - apex).y + (right - apex).y).abs() < 1e-12);
        assert!((left - apex).y < 0.0);
        assert!(((left + right) / 2.0 - apex).x < 0.0);

        // lonov 90 looks south.
        view.set_lonov(90.0);
        let [_, left, right] = cone_vertices(apex, &view, 0.1);
        let mid = (left + right) / 2.0 - apex;
        assert!(mid.x.abs() < 1e-12);
        assert!(mid.y < 0.0);
    }

    #[test]
    fn test_cone_shrinks_when_zoomed_in() {
        let mut view = ViewState::default();
        let apex = DVec2::ZERO;
        view.set_fov(80.0);
        let wide = cone_vertices(apex, &view, 0.1)[1].length();
        view.set_fov(20.0);
        let narrow = cone_vertices(apex, &view, 0.1)[1].length();
        assert!(narrow < wide);
    }

    #[test]
    fn test_floor_image_extent() {
        let origin = GeoPoint::new(0.0, 0.0, 0.0);
        let [left, bottom, right, top] = floor_image_extent(&floor_map(), origin);
        assert!((left - -30.0).abs() < 1e-9);
        assert!((right - 270.0).abs() < 1e-9);
        assert!((bottom - -60.0).abs() < 1e-9);
        assert!((top - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_redraw_shows_active_floor_only() {
        let nodes = site();
        let mut overlay = MapOverlay::new(RecordingMap::default(), 0.1);
        let node = nodes.node(NodeId(1)).unwrap();
        overlay.redraw(&nodes, node, &ViewState::default());

        let map = overlay.adapter();
        assert_eq!(map.visible_floors, vec![node.floor]);
        assert_eq!(map.markers_with(MarkerStyle::NODE).len(), 2);
        assert_eq!(map.markers_with(MarkerStyle::CURRENT), vec![DVec2::new(11.0, 48.0)]);
        assert_eq!(map.center, Some(DVec2::new(11.0, 48.0)));
        assert_eq!(map.polygons().len(), 1);
    }

    #[test]
    fn test_redraw_replaces_previous_features() {
        let nodes = site();
        let mut overlay = MapOverlay::new(RecordingMap::default(), 0.1);
        let view = ViewState::default();
        overlay.redraw(&nodes, nodes.node(NodeId(1)).unwrap(), &view);
        overlay.redraw(&nodes, nodes.node(NodeId(3)).unwrap(), &view);

        let map = overlay.adapter();
        assert_eq!(map.markers_with(MarkerStyle::NODE).len(), 1);
        assert_eq!(map.markers_with(MarkerStyle::CURRENT).len(), 1);
        assert_eq!(map.polygons().len(), 1);
        assert_eq!(map.visible_floors.len(), 1);
    }

    #[test]
    fn test_direction_before_redraw_is_noop() {
        let mut overlay = MapOverlay::new(RecordingMap::default(), 0.1);
        overlay.show_direction(&ViewState::default());
        assert!(overlay.adapter().features().is_empty());
        assert_eq!(overlay.adapter().redraws, 0);
    }

    #[test]
    fn test_zoom_steps() {
        let mut overlay = MapOverlay::new(RecordingMap::new(18.0), 0.1);
        overlay.zoom_in();
        overlay.zoom_in();
        overlay.zoom_out();
        assert_eq!(overlay.adapter().zoom, 19.0);
    }
}
