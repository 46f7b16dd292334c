//! Headless host for the Vista panorama viewer.
//!
//! Loads a site and optional POIs, replays a scripted input session against
//! recording adapters, and prints the emitted viewer events as JSON lines.
//!
//! Run with: `cargo run -p vista-app -- --nodes site.ron --script tour.ron`

mod error;
mod poi;
mod script;
mod site;

use std::cell::RefCell;
use std::rc::Rc;

use clap::Parser;
use tracing::{error, info};
use vista_config::{CliArgs, Config, default_config_dir};
use vista_nav::NavigationController;
use vista_nav::recording::{RecordingMap, RecordingRenderer};
use vista_scene::NodeId;

use crate::error::ScriptError;
use crate::script::Script;

fn run(args: &CliArgs, config: &Config) -> Result<(), ScriptError> {
    let nodes = site::load_site(&args.nodes, &config.scene)?;
    info!(
        "Site: {} nodes on {} floors, origin {}",
        nodes.len(),
        nodes.floors().len(),
        nodes.frame().origin()
    );

    let script = match &args.script {
        Some(path) => script::load_script(path)?,
        None => Script::default(),
    };
    let start = script
        .start
        .map(NodeId)
        .or_else(|| nodes.nodes().first().map(|node| node.id))
        .ok_or(ScriptError::EmptySite)?;

    let mut controller = NavigationController::new(
        config,
        nodes,
        RecordingRenderer::auto_resolving(),
        RecordingMap::new(config.map.initial_zoom),
    );

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    controller.subscribe(move |event| sink.borrow_mut().push(*event));

    if let Some(path) = &args.pois {
        let pois = site::read_pois(path)?;
        poi::register_pois(&mut controller, &pois);
    }

    script::replay(&mut controller, start, &script)?;

    let events = events.borrow();
    info!("Session emitted {} events", events.len());
    script::write_events(std::io::stdout().lock(), &events)
}

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = match &config_dir {
        Some(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args);

    let log_dir = config
        .debug
        .log_dir
        .clone()
        .or_else(|| config_dir.as_ref().map(|dir| dir.join("logs")));
    vista_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    info!("Vista panorama viewer");
    info!(
        "View: fov={} [{}, {}] | pan_speed={} | base_url={}",
        config.view.default_fov,
        config.view.min_fov,
        config.view.max_fov,
        config.controls.pan_speed,
        config.scene.base_url
    );

    if let Err(e) = run(&args, &config) {
        error!("{e}");
        std::process::exit(1);
    }
}
