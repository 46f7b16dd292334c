//! Per-panorama depth maps.
//!
//! Each panorama has an equirectangular depth image whose pixels encode the
//! distance to the nearest surface in millimetres as a 24-bit little-endian
//! integer spread over the red (LSB), green and blue (MSB) channels. Alpha is
//! ignored. The host decodes the image; this type only samples the pixels.

use glam::{DQuat, DVec3};
use thiserror::Error;
use vista_geo::direction_to_lon_lat;

/// Depth images are always produced at this size.
pub const DEPTH_MAP_WIDTH: u32 = 1024;
pub const DEPTH_MAP_HEIGHT: u32 = 512;

/// Errors constructing a [`DepthMap`].
#[derive(Debug, Error, PartialEq)]
pub enum DepthError {
    /// Width or height is zero.
    #[error("depth map dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// Buffer length does not match `width * height * 4`.
    #[error("depth map data size ({actual}) does not match expected ({expected})")]
    DataSizeMismatch { actual: usize, expected: usize },
}

/// Decoded RGBA depth image.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthMap {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl DepthMap {
    /// Wrap decoded RGBA8 pixels.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, DepthError> {
        if width == 0 || height == 0 {
            return Err(DepthError::ZeroDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(DepthError::DataSizeMismatch {
                actual: rgba.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth in metres stored at a pixel, `None` outside the image.
    pub fn depth_at_pixel(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let [r, g, b] = [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2]];
        let millimetres = u32::from(r) | u32::from(g) << 8 | u32::from(b) << 16;
        Some(f64::from(millimetres) / 1000.0)
    }

    /// Depth in metres along a viewing direction in scene space.
    ///
    /// The depth image is stored unrotated, so the direction is first taken
    /// into the panorama's frame with `orientation`.
    pub fn depth_along(&self, direction: DVec3, orientation: DQuat) -> f64 {
        let mapped = orientation * direction;
        let (lon, lat) = direction_to_lon_lat(mapped);

        let image_lon = ((180.0 - lon) + 360.0).rem_euclid(360.0);
        let px = ((image_lon / 360.0) * f64::from(self.width)) as u32;
        let py = (((lat + 90.0) / 180.0) * f64::from(self.height)) as u32;

        let px = px.min(self.width - 1);
        let py = py.min(self.height - 1);
        self.depth_at_pixel(px, py).unwrap_or(0.0)
    }
}
