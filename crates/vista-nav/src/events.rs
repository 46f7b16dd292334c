//! Notifications emitted to the host application.

use serde::Serialize;
use vista_scene::NodeId;

/// Something the user did that the host may want to react to.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewerEvent {
    /// The viewing direction or field of view settled on new values.
    Viewed { lonov: f64, latov: f64, fov: f64 },
    /// The viewer moved to another panorama.
    Moved { node: NodeId },
}

type Listener = Box<dyn FnMut(&ViewerEvent)>;

/// Synchronous fan-out of [`ViewerEvent`]s to subscribed listeners, in
/// subscription order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ViewerEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: ViewerEvent) {
        tracing::debug!(?event, "viewer event");
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
