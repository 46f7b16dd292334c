//! Viewer settings with defaults, persisted as RON in the config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Camera orientation and field-of-view limits.
    pub view: ViewConfig,
    /// Pointer, wheel and keyboard tuning.
    pub controls: ControlsConfig,
    /// Panorama scene settings.
    pub scene: SceneConfig,
    /// 2D map overlay settings.
    pub map: MapConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Camera orientation and field-of-view limits, all in degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Field of view a fresh session starts with.
    pub default_fov: f64,
    /// Narrowest field of view (most zoomed in).
    pub min_fov: f64,
    /// Widest field of view.
    pub max_fov: f64,
    /// Absolute latitude-of-view limit. Keeps the camera off the poles.
    pub latitude_limit: f64,
}

/// Input tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Field-of-view change per unit of wheel delta.
    pub zoom_speed: f64,
    /// Degrees of rotation per pixel of pointer drag at maximum field of view.
    pub pan_speed: f64,
    /// Degrees rotated by one left/right arrow key press.
    pub arrow_rotate_deg: f64,
    /// Metres walked by one up/down arrow key press.
    pub arrow_move_distance: f64,
    /// Field-of-view change in degrees for the `+`/`-` keys.
    pub key_zoom_step: f64,
}

/// Panorama scene configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Base URL panorama and depth images are fetched from.
    pub base_url: String,
    /// Radius of the panorama sphere in metres. Also bounds which nodes and
    /// interactive meshes are considered near the viewer.
    pub sphere_radius: f64,
    /// Extra planar distance beyond `sphere_radius` a hovered floor point may
    /// be from a node and still select it.
    pub hover_margin: f64,
    /// Highest progressive resolution level to load (levels start at 0).
    pub max_resolution: u8,
    /// Kilometres per degree of longitude at the site.
    pub lon_scalar_km: f64,
    /// Kilometres per degree of latitude at the site.
    pub lat_scalar_km: f64,
}

/// 2D map overlay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    /// Divisor applied to the field-of-view cone radius.
    pub scaling_map: f64,
    /// Zoom level the map starts at.
    pub initial_zoom: f64,
    /// Maximum map-space distance (Web-Mercator metres) between a double
    /// click and a node for the click to navigate there.
    pub double_click_threshold: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Directory for JSON log files in debug builds.
    pub log_dir: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_fov: 80.0,
            min_fov: 10.0,
            max_fov: 100.0,
            latitude_limit: 85.0,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            zoom_speed: 0.05,
            pan_speed: 0.1,
            arrow_rotate_deg: 3.0,
            arrow_move_distance: 2.5,
            key_zoom_step: 5.0,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            base_url: "assets/".to_string(),
            sphere_radius: 10.0,
            hover_margin: 5.0,
            max_resolution: 3,
            lon_scalar_km: 71.5,
            lat_scalar_km: 111.3,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            scaling_map: 0.1,
            initial_zoom: 20.0,
            double_click_threshold: 1000.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Platform config directory for the viewer (`<config>/vista`).
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vista"))
}

// --- Validation / Load / Save / Reload ---

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let view = &self.view;
        if !(view.min_fov > 0.0 && view.min_fov <= view.max_fov) {
            return Err(ConfigError::Invalid(format!(
                "fov range [{}, {}] is empty or non-positive",
                view.min_fov, view.max_fov
            )));
        }
        if !(view.min_fov..=view.max_fov).contains(&view.default_fov) {
            return Err(ConfigError::Invalid(format!(
                "default_fov {} outside [{}, {}]",
                view.default_fov, view.min_fov, view.max_fov
            )));
        }
        if !(view.latitude_limit > 0.0 && view.latitude_limit < 90.0) {
            return Err(ConfigError::Invalid(format!(
                "latitude_limit {} must lie in (0, 90)",
                view.latitude_limit
            )));
        }
        if self.scene.sphere_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "sphere_radius {} must be positive",
                self.scene.sphere_radius
            )));
        }
        Ok(())
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let config = read_config(&config_path)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::WriteError {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::WriteError {
            path: config_path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Re-read `config.ron`. Returns the new config only if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let new_config = read_config(&config_path)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("max_fov: 100.0"));
        assert!(ron_str.contains("pan_speed: 0.1"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(view: (), controls: (), scene: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.map, MapConfig::default());
        assert_eq!(config.debug, DebugConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let ron_str = "(view: (max_fov: 120.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.view.max_fov, 120.0);
        assert_eq!(config.view.min_fov, 10.0);
    }

    #[test]
    fn test_inverted_fov_range_rejected() {
        let mut config = Config::default();
        config.view.min_fov = 120.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_latitude_limit_must_avoid_poles() {
        let mut config = Config::default();
        config.view.latitude_limit = 90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.controls.pan_speed = 0.25;
        config.scene.base_url = "https://example.org/pano/".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.view.default_fov = 60.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().view.default_fov, 60.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_broken_config_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();

        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.ron"));

        let err = Config::default().reload(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_reload_without_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::default().reload(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains("config.ron"));
    }
}
