//! Panorama camera: a pinhole at the node position looking along the
//! direction given by the view angles.

use glam::{DMat4, DVec2, DVec3};
use vista_geo::{Ray, lon_lat_to_direction};

use crate::view_state::ViewState;

/// Camera placed at the centre of the panorama sphere. The world is Z-up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanoramaCamera {
    /// Position in local metres.
    pub position: DVec3,
    /// Unit viewing direction.
    pub look: DVec3,
    /// Vertical field of view in degrees.
    pub fov: f64,
    /// Width / height.
    pub aspect: f64,
    /// Near clip plane distance.
    pub near: f64,
    /// Far clip plane distance.
    pub far: f64,
}

impl PanoramaCamera {
    /// Point the camera according to `view`.
    pub fn apply_view(&mut self, view: &ViewState) {
        self.look = lon_lat_to_direction(view.lonov(), view.latov());
        self.fov = view.fov();
    }

    /// Update the aspect ratio from a viewport size. Zero-height viewports
    /// are ignored.
    pub fn set_aspect_ratio(&mut self, width: f64, height: f64) {
        if height > 0.0 && width > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Right and up vectors of the image plane.
    fn basis(&self) -> (DVec3, DVec3) {
        let right = self.look.cross(DVec3::Z).try_normalize().unwrap_or(DVec3::Y);
        let up = right.cross(self.look);
        (right, up)
    }

    /// Ray from the camera through a point in normalized device coordinates
    /// (`x`, `y` in `[-1, 1]`, `y` up).
    pub fn ray_through(&self, ndc: DVec2) -> Option<Ray> {
        let (right, up) = self.basis();
        let tan_half = (self.fov.to_radians() / 2.0).tan();
        let dir = self.look + right * (ndc.x * tan_half * self.aspect) + up * (ndc.y * tan_half);
        Ray::new(self.position, dir)
    }

    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_to_rh(self.position, self.look, DVec3::Z)
    }

    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for PanoramaCamera {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            look: DVec3::NEG_X,
            fov: 80.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}
