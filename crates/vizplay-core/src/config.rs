//! Application configuration, loaded once at startup from JSON.
//!
//! Every section and key is optional in the file and falls back to the
//! defaults below, except the symmetric-spectrum parameters: those stay
//! `None` when absent and the visualizer refuses to run the operations that
//! need them.

use crate::color::Color;
use crate::error::{Result, VizPlayError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub visualization: VisualizationConfig,
    pub symmetric_spectrum: SymmetricSpectrumConfig,
    pub player: PlayerConfig,
    pub theme: ThemeConfig,
    pub disco: DiscoConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Parse configuration from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| VizPlayError::Serialization(format!("Invalid config: {}", e)))
    }

    /// Load configuration from a file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let config = Self::from_json(&data)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Serialize to pretty JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| VizPlayError::Serialization(format!("Failed to serialize config: {}", e)))
    }
}

/// Smoothing kernel applied to waveforms and spectra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothType {
    /// Moving average over `smoothing_window` samples.
    #[default]
    Uniform,
    /// Gaussian with sigma = `smoothing_window / 3`.
    Gaussian,
}

/// Window function applied before the spectrum transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    /// Rectangular window (no tapering).
    None,
    /// Hann window.
    #[default]
    Hann,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    #[serde(alias = "smooth")]
    pub smoothing_enabled: bool,
    pub smooth_type: SmoothType,
    pub smoothing_window: usize,
    /// Fill under the spectrum curve.
    pub fill: bool,
    /// Visualization ticks per second.
    pub fps: u32,
    pub window_function: WindowFunction,
    /// Frames pulled from the engine on each tick.
    pub window_size: usize,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            smoothing_enabled: true,
            smooth_type: SmoothType::Uniform,
            smoothing_window: 5,
            fill: true,
            fps: 30,
            window_function: WindowFunction::Hann,
            window_size: 2048,
        }
    }
}

impl VisualizationConfig {
    /// Tick interval in milliseconds, at least 1.
    pub fn tick_interval_ms(&self) -> u64 {
        (1000 / u64::from(self.fps.max(1))).max(1)
    }
}

/// Parameters of the rotating, trailing spectrum effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymmetricSpectrumConfig {
    /// Jitter range in degrees, sampled uniformly from `[-r, r]`.
    pub random_angle_range: Option<f32>,
    pub trail_decay_factor: Option<f32>,
    pub trail_length: Option<usize>,
    pub intensity_to_color_factor: Option<f32>,
    pub rotation_speed_multiplier: Option<f32>,
    pub saturation_shift_factor: f32,
    pub value_shift_factor: f32,
}

impl Default for SymmetricSpectrumConfig {
    fn default() -> Self {
        Self {
            random_angle_range: None,
            trail_decay_factor: None,
            trail_length: None,
            intensity_to_color_factor: None,
            rotation_speed_multiplier: None,
            saturation_shift_factor: 0.05,
            value_shift_factor: 0.05,
        }
    }
}

impl SymmetricSpectrumConfig {
    /// Fetch a required parameter or fail with the dotted key name.
    pub fn require<T: Copy>(value: Option<T>, key: &str) -> Result<T> {
        value.ok_or_else(|| VizPlayError::InvalidConfig(format!("symmetric_spectrum.{key}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial volume in percent (0-100).
    pub volume: u8,
    /// Sleep one buffer period after the last, zero-padded chunk.
    pub end_of_stream_wait: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 80,
            end_of_stream_wait: false,
        }
    }
}

impl PlayerConfig {
    /// Linear gain for the configured volume.
    pub fn gain(&self) -> f32 {
        f32::from(self.volume.min(100)) / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub background_waveform: String,
    pub background_spectrum: String,
    pub line_color: String,
    /// RGBA fill under the spectrum.
    pub fill_color: [u8; 4],
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background_waveform: "#000000".into(),
            background_spectrum: "#000000".into(),
            line_color: "#00FF00".into(),
            fill_color: [0, 255, 0, 80],
        }
    }
}

impl ThemeConfig {
    pub fn waveform_background(&self) -> Result<Color> {
        Color::from_hex(&self.background_waveform)
    }

    pub fn spectrum_background(&self) -> Result<Color> {
        Color::from_hex(&self.background_spectrum)
    }

    pub fn line(&self) -> Result<Color> {
        Color::from_hex(&self.line_color)
    }

    pub fn fill(&self) -> Color {
        let [r, g, b, a] = self.fill_color;
        Color::from_rgba8(r, g, b, a)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoConfig {
    /// Hue advance per unit of intensity per tick.
    pub color_speed: f32,
}

impl Default for DiscoConfig {
    fn default() -> Self {
        Self { color_speed: 0.2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Modes offered to the user, in cycle order.
    pub modes: Vec<VisualizationMode>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            modes: vec![
                VisualizationMode::Waveform,
                VisualizationMode::Spectrum,
                VisualizationMode::Disco,
            ],
        }
    }
}

/// What the visualizer draws on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationMode {
    #[default]
    #[serde(alias = "Waveform")]
    Waveform,
    #[serde(alias = "Spectrum")]
    Spectrum,
    #[serde(alias = "Disco")]
    Disco,
    #[serde(alias = "Symmetric")]
    Symmetric,
}

impl VisualizationMode {
    pub const ALL: [Self; 4] = [Self::Waveform, Self::Spectrum, Self::Disco, Self::Symmetric];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waveform => "waveform",
            Self::Spectrum => "spectrum",
            Self::Disco => "disco",
            Self::Symmetric => "symmetric",
        }
    }
}

impl fmt::Display for VisualizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualizationMode {
    type Err = VizPlayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VizPlayError::InvalidParameter(format!("unknown visualization mode: {s}")))
    }
}
