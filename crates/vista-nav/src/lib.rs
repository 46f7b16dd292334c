//! Navigation core of the panorama viewer.
//!
//! [`NavigationController`] owns the single [`ViewState`] of a session and
//! turns pointer, wheel and keyboard input into orientation and position
//! changes. The 3D scene and the 2D map are reached through the
//! [`PanoramaRenderer`] and [`MapAdapter`] traits; panorama images arrive
//! asynchronously through [`PanoramaLoader`] completions.

mod adapter;
mod camera;
mod controller;
mod events;
mod loader;
mod map;
pub mod recording;
mod view_state;

pub use adapter::{AssetError, Completion, MapAdapter, MarkerId, MarkerStyle, PanoramaRenderer, Rgba, TextureHandle};
pub use camera::PanoramaCamera;
pub use controller::{HOVER_MARKER, Key, NavigationController};
pub use events::{EventBus, ViewerEvent};
pub use loader::{LoadTicket, PanoramaLoader, PollSummary, depth_url, panorama_url};
pub use map::{MapOverlay, cone_vertices, floor_image_extent};
pub use view_state::{ViewLimits, ViewState};
