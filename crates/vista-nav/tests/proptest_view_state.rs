//! Property tests for view-state wrapping and clamping, and for drag
//! panning being relative to the drag origin.

use glam::DVec2;
use proptest::prelude::*;
use vista_config::Config;
use vista_geo::{GeoPoint, LocalFrame};
use vista_nav::recording::{RecordingMap, RecordingRenderer};
use vista_nav::{NavigationController, ViewState};
use vista_scene::NodeSet;

/// Shortest angular difference between two longitudes in degrees.
fn lon_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

fn empty_controller() -> NavigationController<RecordingRenderer, RecordingMap> {
    let frame = LocalFrame::new(GeoPoint::default(), 71.5, 111.3);
    NavigationController::new(
        &Config::default(),
        NodeSet::new(frame),
        RecordingRenderer::new(),
        RecordingMap::default(),
    )
}

proptest! {
    #[test]
    fn lonov_ignores_whole_turns(lon in -720.0f64..720.0, turns in -20i32..20) {
        let mut a = ViewState::default();
        let mut b = ViewState::default();
        a.set_lonov(lon);
        b.set_lonov(lon + 360.0 * f64::from(turns));
        prop_assert!(lon_diff(a.lonov(), b.lonov()) < 1e-9);
    }

    #[test]
    fn lonov_is_always_in_range(lon in -1e6f64..1e6) {
        let mut view = ViewState::default();
        view.set_lonov(lon);
        prop_assert!((0.0..360.0).contains(&view.lonov()));
    }

    #[test]
    fn latov_saturates_exactly(excess in 0.000_001f64..1e6) {
        let mut view = ViewState::default();
        view.set_latov(85.0 + excess);
        prop_assert_eq!(view.latov(), 85.0);
        view.set_latov(-85.0 - excess);
        prop_assert_eq!(view.latov(), -85.0);
    }

    #[test]
    fn fov_stays_within_limits(fov in -1e4f64..1e4) {
        let mut view = ViewState::default();
        view.set_fov(fov);
        prop_assert!((10.0..=100.0).contains(&view.fov()));
    }

    #[test]
    fn drag_depends_only_on_final_position(
        moves in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..8),
    ) {
        let origin = DVec2::new(400.0, 300.0);
        let last = moves.last().map(|&(x, y)| DVec2::new(x, y)).unwrap_or(origin);

        let mut many = empty_controller();
        many.on_pointer_down(origin);
        for &(x, y) in &moves {
            many.on_pointer_move(DVec2::new(x, y));
        }

        let mut single = empty_controller();
        single.on_pointer_down(origin);
        single.on_pointer_move(last);

        prop_assert!(lon_diff(many.view_state().lonov(), single.view_state().lonov()) < 1e-9);
        prop_assert!((many.view_state().latov() - single.view_state().latov()).abs() < 1e-9);
    }
}
