//! VizPlay Audio - Playback engine
//!
//! Streams a decoded track to an output device and exposes the window of
//! audio just played so the visualizer can follow along.
//!
//! Architecture:
//! - `PlaybackEngine`: transport controls (play/pause/stop/seek/volume)
//! - `RenderHandle`: the audio-callback side, pulls frames and advances the cursor
//! - `OutputBackend`: opens device streams (cpal, silent, null)

pub mod engine;
pub mod output;
pub mod render;

pub use engine::{EngineOptions, PlaybackEngine};
pub use output::{
    CpalBackend, NullBackend, NullStats, OutputBackend, OutputStream, SilentBackend, StreamSpec,
};
pub use render::{FillStatus, RenderHandle};
