//! Command-line argument parsing for the Vista viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Vista command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "vista", about = "Panorama viewer navigation core")]
pub struct CliArgs {
    /// Site manifest (`.ron`), or a single-floor node metadata file of
    /// `(id, [lon, lat, z], [qx, qy, qz, qw])` records.
    #[arg(long)]
    pub nodes: PathBuf,

    /// POI metadata file: `(id, [x, y, z])` records.
    #[arg(long)]
    pub pois: Option<PathBuf>,

    /// RON input script to replay against the viewer.
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Base URL for panorama images.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Starting field of view in degrees.
    #[arg(long)]
    pub fov: Option<f64>,

    /// Drag pan speed.
    #[arg(long)]
    pub pan_speed: Option<f64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref url) = args.base_url {
            self.scene.base_url = url.clone();
        }
        if let Some(fov) = args.fov {
            self.view.default_fov = fov.clamp(self.view.min_fov, self.view.max_fov);
        }
        if let Some(speed) = args.pan_speed {
            self.controls.pan_speed = speed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
