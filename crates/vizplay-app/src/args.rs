//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;
use vizplay_core::VisualizationMode;

/// Play audio files and log what the visualizer draws.
#[derive(Parser, Debug)]
#[command(name = "vizplay", author, version, about, long_about = None)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Visualization mode (waveform, spectrum, disco, symmetric)
    #[arg(short, long)]
    pub mode: Option<VisualizationMode>,

    /// Switch to the next configured mode every N seconds
    #[arg(long, value_name = "SECS")]
    pub cycle: Option<u64>,

    /// Run on a clocked silent output instead of the audio device
    #[arg(long)]
    pub silent: bool,

    /// Start over after the last track
    #[arg(long = "loop")]
    pub repeat: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Audio files to play, in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
