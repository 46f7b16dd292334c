//! Configuration system for the Vista panorama viewer.
//!
//! Viewer tuning (field-of-view limits, pan/zoom speeds, keyboard steps, map
//! scaling) lives in one RON file. Supports CLI overrides via clap,
//! hot-reload detection, and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, ControlsConfig, DebugConfig, MapConfig, SceneConfig, ViewConfig, default_config_dir,
};
pub use error::ConfigError;
