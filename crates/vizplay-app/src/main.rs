//! VizPlay - audio player with a live visualization pipeline
//!
//! Entry point: parse arguments, load config, play the playlist and run the
//! visualization tick loop until it ends.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vizplay_app::session::{self, ModeCycle, SessionOptions};
use vizplay_app::{Args, Controller};
use vizplay_audio::{EngineOptions, PlaybackEngine};
use vizplay_core::Config;
use vizplay_viz::Visualizer;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("VizPlay starting...");

    let config = load_config(&args.config)?;
    let start_mode = args
        .mode
        .or_else(|| config.ui.modes.first().copied())
        .unwrap_or_default();
    let mut modes = ModeCycle::new(&config.ui.modes, start_mode);

    for file in &args.files {
        if !vizplay_media::is_supported(file) {
            warn!("{}: unrecognized extension, trying anyway", file.display());
        }
    }

    let options = EngineOptions::from(&config.player);
    let engine = if args.silent {
        PlaybackEngine::silent(options)
    } else {
        PlaybackEngine::with_default_device(options)
    };

    let mut visualizer = Visualizer::new(&config).context("invalid theme colors")?;
    let mut controller = Controller::new(engine, config.player.volume);
    controller
        .add_tracks(args.files.iter().cloned())
        .context("failed to load the first track")?;
    controller
        .toggle_play_pause()
        .context("failed to start playback")?;

    let session_options =
        SessionOptions::from_config(&config, args.repeat, args.cycle.map(Duration::from_secs));
    let stats = session::run(&mut controller, &mut visualizer, &mut modes, &session_options)?;

    controller.stop();
    info!("Played {} track(s)", stats.tracks_started);
    Ok(())
}

/// Read the config file, falling back to defaults when it does not exist.
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        warn!("{} not found, using default configuration", path.display());
        return Ok(Config::default());
    }
    Config::load_from_file(path).with_context(|| format!("failed to read {}", path.display()))
}
