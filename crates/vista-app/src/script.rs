//! Scripted input sessions.
//!
//! A script is a RON file listing input steps. Each step is applied to the
//! controller, then completed asset loads are drained, the way a host's
//! event loop would between frames.

use std::io::Write;
use std::path::Path;

use glam::DVec2;
use serde::Deserialize;
use vista_geo::{GeoPoint, from_lon_lat};
use vista_nav::{Key, MapAdapter, NavigationController, PanoramaRenderer, ViewerEvent};
use vista_scene::NodeId;

use crate::error::ScriptError;
use crate::site::read;

/// One input step. Pointer positions are screen pixels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub enum Step {
    Resize { width: f64, height: f64 },
    PointerDown(f64, f64),
    PointerMove(f64, f64),
    PointerUp,
    Wheel(f64),
    Key(Key),
    /// Resolve the node under the cursor.
    Hover(f64, f64),
    /// Navigate to the given node, or to the hover-resolved one.
    DoubleClick(Option<u32>),
    /// Double click on the map at a position in degrees.
    MapDoubleClick { lon: f64, lat: f64 },
    View { lonov: f64, latov: f64, fov: f64 },
    MoveTo(GeoPoint),
    Goto(u32),
    Click(f64, f64),
    ContextMenu(f64, f64),
    TargetHover(f64, f64),
    TargetDragStart(f64, f64),
    TargetDrag(f64, f64),
    TargetDragEnd,
    /// Change the map zoom by whole levels.
    MapZoom(i32),
}

/// A scripted session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Node to start at. Defaults to the first node of the site.
    pub start: Option<u32>,
    /// Viewport size in pixels.
    pub viewport: (f64, f64),
    pub steps: Vec<Step>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            start: None,
            viewport: (1280.0, 720.0),
            steps: Vec::new(),
        }
    }
}

pub fn load_script(path: &Path) -> Result<Script, ScriptError> {
    ron::from_str(&read(path)?).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn point(x: f64, y: f64) -> DVec2 {
    DVec2::new(x, y)
}

fn apply<R: PanoramaRenderer, M: MapAdapter>(
    controller: &mut NavigationController<R, M>,
    step: &Step,
) -> Result<(), ScriptError> {
    match *step {
        Step::Resize { width, height } => controller.on_resize(width, height),
        Step::PointerDown(x, y) => controller.on_pointer_down(point(x, y)),
        Step::PointerMove(x, y) => {
            controller.on_pointer_move(point(x, y));
        }
        Step::PointerUp => {
            controller.on_pointer_up();
        }
        Step::Wheel(delta) => controller.on_wheel(delta),
        Step::Key(key) => controller.on_key(key),
        Step::Hover(x, y) => {
            let node = controller.on_hover(point(x, y));
            tracing::debug!(?node, "hover");
        }
        Step::DoubleClick(target) => {
            if !controller.on_double_click(target.map(NodeId)) {
                tracing::info!("double click resolved no node");
            }
        }
        Step::MapDoubleClick { lon, lat } => {
            if !controller.on_map_double_click(from_lon_lat(lon, lat)) {
                tracing::info!(lon, lat, "map double click resolved no node");
            }
        }
        Step::View { lonov, latov, fov } => controller.view(lonov, latov, fov),
        Step::MoveTo(global) => {
            controller.move_to(global);
        }
        Step::Goto(id) => {
            if !controller.navigate_to(NodeId(id)) {
                return Err(ScriptError::UnknownNode(NodeId(id)));
            }
        }
        Step::Click(x, y) => controller.on_click(point(x, y)),
        Step::ContextMenu(x, y) => match controller.on_context_menu(point(x, y)) {
            Some(items) => {
                let keys: Vec<_> = items.iter().map(|item| item.key.as_str()).collect();
                tracing::info!(?keys, "context menu");
            }
            None => tracing::info!("context menu suppressed"),
        },
        Step::TargetHover(x, y) => controller.on_target_hover(point(x, y)),
        Step::TargetDragStart(x, y) => controller.on_target_drag_start(point(x, y)),
        Step::TargetDrag(x, y) => controller.on_target_drag(point(x, y)),
        Step::TargetDragEnd => controller.on_target_drag_end(),
        Step::MapZoom(levels) => {
            let map = controller.map_mut();
            for _ in 0..levels.unsigned_abs() {
                if levels > 0 {
                    map.zoom_in();
                } else {
                    map.zoom_out();
                }
            }
        }
    }
    Ok(())
}

/// Drain completions until a poll applies nothing, as idle frames would.
fn settle<R: PanoramaRenderer, M: MapAdapter>(controller: &mut NavigationController<R, M>) {
    loop {
        let summary = controller.poll_loads();
        if summary.failed > 0 {
            tracing::debug!(failed = summary.failed, "loads failed");
        }
        if summary.applied == 0 {
            break;
        }
    }
}

/// Run `script` from `start`, draining loads after every step.
pub fn replay<R: PanoramaRenderer, M: MapAdapter>(
    controller: &mut NavigationController<R, M>,
    start: NodeId,
    script: &Script,
) -> Result<(), ScriptError> {
    let (width, height) = script.viewport;
    controller.on_resize(width, height);
    if !controller.navigate_to(start) {
        return Err(ScriptError::UnknownNode(start));
    }
    settle(controller);

    for (index, step) in script.steps.iter().enumerate() {
        tracing::trace!(index, ?step, "step");
        apply(controller, step)?;
        settle(controller);
    }
    tracing::info!(
        steps = script.steps.len(),
        node = ?controller.current_node(),
        view = ?controller.view_state(),
        "script finished"
    );
    Ok(())
}

/// Write events as JSON lines.
pub fn write_events(mut out: impl Write, events: &[ViewerEvent]) -> Result<(), ScriptError> {
    for event in events {
        serde_json::to_writer(&mut out, event)?;
        out.write_all(b"\n").map_err(ScriptError::Write)?;
    }
    Ok(())
}
