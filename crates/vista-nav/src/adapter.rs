//! Seams to the rendering engine and the map widget.
//!
//! The navigation core never touches a GPU or a tile server; it issues calls
//! through these traits. Asset loads hand back a [`Completion`] the core polls
//! on its own thread.

use glam::{DVec2, DVec3};
use thiserror::Error;
use vista_interact::TargetId;
use vista_scene::{DepthMap, FloorId, NodeId};

/// Opaque handle to a decoded panorama texture owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a feature drawn on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// Failure of an asynchronous asset load.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssetError {
    /// Fetching the resource failed.
    #[error("failed to fetch {url}: {reason}")]
    Network { url: String, reason: String },

    /// The resource was fetched but could not be decoded.
    #[error("failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The loader dropped the request without answering.
    #[error("load of {url} was cancelled")]
    Cancelled { url: String },
}

/// Single-shot completion of an asset load.
pub type Completion<T> = crossbeam_channel::Receiver<Result<T, AssetError>>;

/// 8-bit RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

/// How a map feature is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerStyle {
    pub fill: Rgba,
    pub stroke: Option<Rgba>,
    /// Point radius in pixels; unused for polygons.
    pub radius: f64,
}

impl MarkerStyle {
    /// Panorama positions of the displayed floor.
    pub const NODE: Self = Self {
        fill: Rgba(0, 0, 0, 255),
        stroke: None,
        radius: 1.0,
    };

    /// The panorama currently shown.
    pub const CURRENT: Self = Self {
        fill: Rgba(255, 0, 0, 255),
        stroke: None,
        radius: 3.0,
    };

    /// Field-of-view cone.
    pub const VIEW_CONE: Self = Self {
        fill: Rgba(255, 0, 0, 51),
        stroke: Some(Rgba(255, 0, 0, 102)),
        radius: 0.0,
    };
}

/// The 3D engine displaying the panorama sphere.
pub trait PanoramaRenderer {
    /// Point the camera along a unit direction in local space.
    fn set_camera_look_at(&mut self, direction: DVec3);

    fn set_camera_position(&mut self, position: DVec3);

    /// Vertical field of view in degrees.
    fn set_camera_fov(&mut self, fov: f64);

    fn set_camera_aspect(&mut self, aspect: f64);

    /// Start fetching and decoding a panorama image.
    fn load_texture(&mut self, url: &str) -> Completion<TextureHandle>;

    /// Start fetching and decoding a depth image.
    fn load_depth(&mut self, url: &str) -> Completion<DepthMap>;

    /// Map a loaded texture onto the panorama sphere of `node`.
    fn show_panorama(&mut self, node: NodeId, texture: TextureHandle);

    /// Place a visible object in the scene.
    fn add_to_scene(&mut self, target: TargetId, position: DVec3, radius: f64);

    fn remove_from_scene(&mut self, target: TargetId);
}

/// The 2D map widget. Coordinates are `(lon, lat)` in degrees.
pub trait MapAdapter {
    fn set_center(&mut self, lon_lat: DVec2);

    fn zoom(&self) -> f64;

    fn set_zoom(&mut self, level: f64);

    fn add_marker(&mut self, lon_lat: DVec2, style: MarkerStyle) -> MarkerId;

    /// Remove a point or polygon feature. Unknown ids are ignored.
    fn remove_marker(&mut self, id: MarkerId);

    /// Show or hide a floor-plan image layer.
    fn set_floor_visible(&mut self, floor: FloorId, visible: bool);

    fn set_polygon(&mut self, points: &[DVec2], style: MarkerStyle) -> MarkerId;

    /// Flush pending changes to the screen.
    fn redraw(&mut self);
}
