//! Display-ready output of one visualization tick.

use serde::Serialize;
use std::fmt;
use vizplay_core::{Color, VisualizationMode};

/// What a renderer should draw for the current tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum VisualFrame {
    /// Smoothed mono waveform scaled into [-1, 1].
    Waveform {
        points: Vec<f32>,
        background: Color,
        line: Color,
    },
    /// Spectrum on a log-frequency axis, magnitudes scaled into [0, 1].
    Spectrum {
        /// `log10(bin + 1)` per bin.
        x: Vec<f32>,
        y: Vec<f32>,
        background: Color,
        line: Color,
        /// Area under the curve, when filling is enabled.
        fill: Option<Color>,
    },
    /// Plain background whose hue follows the signal.
    Disco { background: Color, intensity: f32 },
    /// Rotated spectrum with its decayed history, oldest trail first.
    Symmetric {
        spectrum: Vec<f32>,
        trails: Vec<Vec<f32>>,
        color: [u8; 3],
        rotation: f32,
    },
}

impl VisualFrame {
    pub fn mode(&self) -> VisualizationMode {
        match self {
            Self::Waveform { .. } => VisualizationMode::Waveform,
            Self::Spectrum { .. } => VisualizationMode::Spectrum,
            Self::Disco { .. } => VisualizationMode::Disco,
            Self::Symmetric { .. } => VisualizationMode::Symmetric,
        }
    }

    /// Background color, if the mode draws one.
    pub fn background(&self) -> Option<Color> {
        match self {
            Self::Waveform { background, .. }
            | Self::Spectrum { background, .. }
            | Self::Disco { background, .. } => Some(*background),
            Self::Symmetric { .. } => None,
        }
    }
}

fn peak(values: &[f32]) -> f32 {
    values.iter().fold(0.0f32, |acc, v| acc.max(v.abs()))
}

impl fmt::Display for VisualFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waveform { points, .. } => {
                write!(f, "waveform: {} pts, peak {:.3}", points.len(), peak(points))
            }
            Self::Spectrum { y, .. } => {
                let loudest = y
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .map_or(0, |(i, _)| i);
                write!(f, "spectrum: {} bins, loudest bin {}", y.len(), loudest)
            }
            Self::Disco {
                background,
                intensity,
            } => write!(
                f,
                "disco: {} (intensity {:.3})",
                background.to_hex(),
                intensity
            ),
            Self::Symmetric {
                spectrum,
                trails,
                color,
                rotation,
            } => write!(
                f,
                "symmetric: {} bins, {} trails, color #{:02x}{:02x}{:02x}, angle {:.1}",
                spectrum.len(),
                trails.len(),
                color[0],
                color[1],
                color[2],
                rotation
            ),
        }
    }
}
