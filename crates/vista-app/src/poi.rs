//! Points of interest as interactive scene targets.

use vista_interact::{EventTarget, MenuItem, TargetId};
use vista_nav::{MapAdapter, NavigationController, PanoramaRenderer};
use vista_scene::PoiSet;

/// Radius in metres of the sphere marking a POI.
const POI_RADIUS: f64 = 0.25;

/// Register every POI with a 3D position as a mesh target. POIs with any
/// other number of coordinates are skipped.
pub fn register_pois<R: PanoramaRenderer, M: MapAdapter>(
    controller: &mut NavigationController<R, M>,
    pois: &PoiSet,
) -> Vec<TargetId> {
    let frame = *controller.nodes().frame();
    let mut ids = Vec::with_capacity(pois.len());
    for poi in pois.iter() {
        let Some(global) = poi.position() else {
            tracing::warn!(poi = poi.id, coords = poi.coords.len(), "skipping POI without a 3D position");
            continue;
        };
        let id = poi.id;
        let target = EventTarget::mesh(frame.to_local(global), POI_RADIUS)
            .on_pointer_enter(move || tracing::info!(poi = id, "pointer entered POI"))
            .on_pointer_leave(move || tracing::info!(poi = id, "pointer left POI"))
            .on_click(move |ctx| tracing::info!(poi = id, location = ?ctx.location, "POI clicked"))
            .on_context_menu(move |_| vec![MenuItem::new(format!("poi-{id}"), format!("Show POI {id}"))]);
        ids.push(controller.add_layer(target));
    }
    tracing::info!(count = ids.len(), "registered POIs");
    ids
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use vista_config::Config;
    use vista_geo::{GeoPoint, LocalFrame};
    use vista_nav::recording::{RecordingMap, RecordingRenderer};
    use vista_scene::{FloorMap, NodeId, NodeRecord, NodeSet, parse_pois};

    use super::*;

    #[test]
    fn test_pois_become_scene_targets() {
        let origin = GeoPoint::new(11.0, 48.0, 500.0);
        let frame = LocalFrame::new(origin, 71.5, 111.3);
        let mut nodes = NodeSet::new(frame);
        let floor = nodes.add_floor("eg", 500.0, FloorMap::default());
        nodes
            .add_nodes(
                floor,
                &[NodeRecord {
                    id: NodeId(1),
                    position: GeoPoint::new(11.0, 48.0, 501.5),
                    orientation: glam::DQuat::IDENTITY,
                }],
            )
            .unwrap();
        let mut c = NavigationController::new(
            &Config::default(),
            nodes,
            RecordingRenderer::new(),
            RecordingMap::default(),
        );
        c.on_resize(800.0, 600.0);
        c.navigate_to(NodeId(1));

        // POI 3 m towards -x at eye height, straight ahead; POI 9 has no z.
        let ahead = frame.to_global(glam::DVec3::new(-3.0, 0.0, 1.5));
        let src = format!("({},[{},{},{}])(9,[1.0,2.0])", 3, ahead.lon, ahead.lat, ahead.z);
        let pois = parse_pois(&src).unwrap();

        let ids = register_pois(&mut c, &pois);
        assert_eq!(ids.len(), 1);
        assert!(c.renderer().scene().contains_key(&ids[0]));

        let items = c.on_context_menu(DVec2::new(400.0, 300.0)).unwrap();
        assert_eq!(items, vec![MenuItem::new("poi-3", "Show POI 3")]);
        c.on_target_hover(DVec2::new(400.0, 300.0));
        assert!(c.registry().is_hovered(ids[0]));
    }
}
