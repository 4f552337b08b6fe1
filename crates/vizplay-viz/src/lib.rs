//! VizPlay Viz - Visualization pipeline
//!
//! Turns the window of audio around the play cursor into display data.
//!
//! - `smoothing`: uniform and Gaussian filters with mirrored borders
//! - `spectrum`: FFT magnitude spectrum with an optional Hann window
//! - `Visualizer`: waveform, spectrum, rotated spectrum, trails, color and
//!   rotation state, and per-mode rendering into a `VisualFrame`

pub mod frame;
pub mod smoothing;
pub mod spectrum;
pub mod visualizer;

pub use frame::VisualFrame;
pub use smoothing::{gaussian_filter, uniform_filter, Smoother};
pub use spectrum::SpectrumAnalyzer;
pub use visualizer::{Visualizer, INITIAL_COLOR};
