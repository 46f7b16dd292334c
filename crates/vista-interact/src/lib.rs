//! Interactive objects placed in the panorama scene.
//!
//! Targets carry an optional set of pointer callbacks. The
//! [`EventLayerRegistry`] tracks which targets are registered, hovered and
//! dragged, and routes pointer input to them based on camera-ray hits.

mod registry;
mod target;

pub use registry::EventLayerRegistry;
pub use target::{EventTarget, MenuItem, PointerContext, TargetId, TargetKind};
