//! Interactive targets and their optional callbacks.

use std::fmt;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Handle of a registered target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u64);

impl TargetId {
    /// Id kept back for scene objects owned by the viewer itself. Never
    /// handed out by the registry.
    pub const RESERVED: TargetId = TargetId(u64::MAX);
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target-{}", self.0)
    }
}

/// Where the pointer was when an event fired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerContext {
    /// Pointer position in screen pixels.
    pub screen: DVec2,
    /// Scene location under the pointer, when depth information is available.
    pub location: Option<DVec3>,
}

/// One entry of a context menu, surfaced to the host UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Stable key the host reports back when the item is chosen.
    pub key: String,
    /// Display text.
    pub label: String,
}

impl MenuItem {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Whether a target is visible in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetKind {
    /// Has a visual representation, hit-tested by its bounding sphere.
    Mesh { center: DVec3, radius: f64 },
    /// No visual representation. Only receives context-menu requests,
    /// regardless of where the pointer is.
    Layer,
}

type ContextHandler = Box<dyn FnMut(&PointerContext)>;
type MenuHandler = Box<dyn FnMut(&PointerContext) -> Vec<MenuItem>>;
type PlainHandler = Box<dyn FnMut()>;

/// An interactive object with an optional-capability callback record.
///
/// Every callback is optional; dispatch skips targets lacking the relevant
/// one. Build with [`EventTarget::mesh`] or [`EventTarget::layer`] and chain
/// the `on_*` setters.
pub struct EventTarget {
    kind: TargetKind,
    on_click: Option<ContextHandler>,
    on_context_menu: Option<MenuHandler>,
    on_pointer_enter: Option<PlainHandler>,
    on_pointer_leave: Option<PlainHandler>,
    on_drag_start: Option<ContextHandler>,
    on_drag: Option<ContextHandler>,
    on_drag_end: Option<PlainHandler>,
}

impl EventTarget {
    fn with_kind(kind: TargetKind) -> Self {
        Self {
            kind,
            on_click: None,
            on_context_menu: None,
            on_pointer_enter: None,
            on_pointer_leave: None,
            on_drag_start: None,
            on_drag: None,
            on_drag_end: None,
        }
    }

    /// A visible target bounded by a sphere.
    pub fn mesh(center: DVec3, radius: f64) -> Self {
        Self::with_kind(TargetKind::Mesh { center, radius })
    }

    /// An invisible layer.
    pub fn layer() -> Self {
        Self::with_kind(TargetKind::Layer)
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    #[must_use]
    pub fn on_click(mut self, f: impl FnMut(&PointerContext) + 'static) -> Self {
        self.on_click = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_context_menu(
        mut self,
        f: impl FnMut(&PointerContext) -> Vec<MenuItem> + 'static,
    ) -> Self {
        self.on_context_menu = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_pointer_enter(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_pointer_enter = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_pointer_leave(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_pointer_leave = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_drag_start(mut self, f: impl FnMut(&PointerContext) + 'static) -> Self {
        self.on_drag_start = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_drag(mut self, f: impl FnMut(&PointerContext) + 'static) -> Self {
        self.on_drag = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_drag_end(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_drag_end = Some(Box::new(f));
        self
    }

    /// Whether hover transitions are observable for this target.
    pub fn tracks_hover(&self) -> bool {
        self.on_pointer_enter.is_some() || self.on_pointer_leave.is_some()
    }

    /// Whether this target takes part in drag sessions.
    pub fn tracks_drag(&self) -> bool {
        self.on_drag_start.is_some() || self.on_drag.is_some() || self.on_drag_end.is_some()
    }

    pub(crate) fn click(&mut self, ctx: &PointerContext) {
        if let Some(f) = self.on_click.as_mut() {
            f(ctx);
        }
    }

    pub(crate) fn context_menu(&mut self, ctx: &PointerContext) -> Vec<MenuItem> {
        self.on_context_menu.as_mut().map(|f| f(ctx)).unwrap_or_default()
    }

    pub(crate) fn pointer_enter(&mut self) {
        if let Some(f) = self.on_pointer_enter.as_mut() {
            f();
        }
    }

    pub(crate) fn pointer_leave(&mut self) {
        if let Some(f) = self.on_pointer_leave.as_mut() {
            f();
        }
    }

    pub(crate) fn drag_start(&mut self, ctx: &PointerContext) {
        if let Some(f) = self.on_drag_start.as_mut() {
            f(ctx);
        }
    }

    pub(crate) fn drag(&mut self, ctx: &PointerContext) {
        if let Some(f) = self.on_drag.as_mut() {
            f(ctx);
        }
    }

    pub(crate) fn drag_end(&mut self) {
        if let Some(f) = self.on_drag_end.as_mut() {
            f();
        }
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("kind", &self.kind)
            .field("on_click", &self.on_click.is_some())
            .field("on_context_menu", &self.on_context_menu.is_some())
            .field("on_pointer_enter", &self.on_pointer_enter.is_some())
            .field("on_pointer_leave", &self.on_pointer_leave.is_some())
            .field("on_drag_start", &self.on_drag_start.is_some())
            .field("on_drag", &self.on_drag.is_some())
            .field("on_drag_end", &self.on_drag_end.is_some())
            .finish()
    }
}
