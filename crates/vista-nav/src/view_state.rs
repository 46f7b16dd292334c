//! Viewing angles and field of view.

use vista_config::ViewConfig;

/// Bounds applied by every [`ViewState`] setter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewLimits {
    /// Smallest field of view in degrees.
    pub min_fov: f64,
    /// Largest field of view in degrees.
    pub max_fov: f64,
    /// Latitude is clamped to `[-latitude_limit, latitude_limit]`.
    pub latitude_limit: f64,
}

impl ViewLimits {
    pub fn from_config(config: &ViewConfig) -> Self {
        Self {
            min_fov: config.min_fov,
            max_fov: config.max_fov,
            latitude_limit: config.latitude_limit,
        }
    }
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self::from_config(&ViewConfig::default())
    }
}

/// Longitude, latitude and field of view of the viewer, in degrees.
///
/// Setters wrap or clamp; getters return the stored value unchanged.
/// Non-finite inputs are ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    lonov: f64,
    latov: f64,
    fov: f64,
    limits: ViewLimits,
}

impl ViewState {
    /// Level view facing longitude 0 at `fov`.
    pub fn new(limits: ViewLimits, fov: f64) -> Self {
        let mut view = Self {
            lonov: 0.0,
            latov: 0.0,
            fov: limits.max_fov,
            limits,
        };
        view.set_fov(fov);
        view
    }

    /// Initial view for a session.
    pub fn from_config(config: &ViewConfig) -> Self {
        Self::new(ViewLimits::from_config(config), config.default_fov)
    }

    pub fn lonov(&self) -> f64 {
        self.lonov
    }

    pub fn latov(&self) -> f64 {
        self.latov
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn limits(&self) -> ViewLimits {
        self.limits
    }

    /// Set longitude, wrapped into `[0, 360)`.
    pub fn set_lonov(&mut self, lonov: f64) {
        if !lonov.is_finite() {
            return;
        }
        let wrapped = lonov.rem_euclid(360.0);
        // rem_euclid rounds tiny negative inputs up to exactly 360.
        self.lonov = if wrapped >= 360.0 { 0.0 } else { wrapped };
    }

    /// Set latitude, clamped into `[-limit, limit]`.
    pub fn set_latov(&mut self, latov: f64) {
        if !latov.is_finite() {
            return;
        }
        let limit = self.limits.latitude_limit;
        self.latov = latov.clamp(-limit, limit);
    }

    /// Set field of view, clamped into `[min_fov, max_fov]`.
    pub fn set_fov(&mut self, fov: f64) {
        if !fov.is_finite() {
            return;
        }
        self.fov = fov.clamp(self.limits.min_fov, self.limits.max_fov);
    }

    /// Ratio of the current to the widest field of view; pointer panning is
    /// scaled by it so that dragging slows down when zoomed in.
    pub fn zoom_scale(&self) -> f64 {
        self.fov / self.limits.max_fov
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::from_config(&ViewConfig::default())
    }
}
