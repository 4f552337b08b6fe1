//! The visualization pipeline.
//!
//! Stateless transforms (waveform, spectrum) plus the stateful pieces of the
//! symmetric effect: a rotation angle in [0, 360), a bounded history of past
//! spectra and the current effect color. Driven from a single tick thread.

use crate::frame::VisualFrame;
use crate::smoothing::Smoother;
use crate::spectrum::SpectrumAnalyzer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::debug;
use vizplay_core::{
    Color, Config, Hsv, Result, SampleWindow, SymmetricSpectrumConfig, VisualizationMode,
};

/// Effect color before the first `update_colors`.
pub const INITIAL_COLOR: [u8; 3] = [0, 0, 255];

/// Theme colors, parsed once.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Palette {
    waveform_background: Color,
    spectrum_background: Color,
    line: Color,
    fill: Color,
}

pub struct Visualizer {
    smoother: Smoother,
    fill: bool,
    symmetric: SymmetricSpectrumConfig,
    disco_speed: f32,
    palette: Palette,
    analyzer: SpectrumAnalyzer,
    rng: StdRng,
    rotation_angle: f32,
    trail_buffer: VecDeque<Vec<f32>>,
    last_color: [u8; 3],
    disco_hue: f32,
}

impl Visualizer {
    /// Build a visualizer from the loaded config.
    ///
    /// Fails with `InvalidConfig` if a theme color does not parse. Missing
    /// symmetric-spectrum parameters are reported later, by the operations
    /// that need them.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Same as `new`, with a reproducible angle jitter.
    pub fn with_seed(config: &Config, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &Config, rng: StdRng) -> Result<Self> {
        let theme = &config.theme;
        let palette = Palette {
            waveform_background: theme.waveform_background()?,
            spectrum_background: theme.spectrum_background()?,
            line: theme.line()?,
            fill: theme.fill(),
        };
        let vis = &config.visualization;
        debug!(
            smoothing = vis.smoothing_enabled,
            window = vis.smoothing_window,
            window_function = ?vis.window_function,
            "Visualizer ready"
        );
        Ok(Self {
            smoother: Smoother::from_config(vis),
            fill: vis.fill,
            symmetric: config.symmetric_spectrum.clone(),
            disco_speed: config.disco.color_speed,
            palette,
            analyzer: SpectrumAnalyzer::new(vis.window_function),
            rng,
            rotation_angle: 0.0,
            trail_buffer: VecDeque::new(),
            last_color: INITIAL_COLOR,
            disco_hue: 0.0,
        })
    }

    pub fn rotation_angle(&self) -> f32 {
        self.rotation_angle
    }

    pub fn last_color(&self) -> [u8; 3] {
        self.last_color
    }

    pub fn trail_len(&self) -> usize {
        self.trail_buffer.len()
    }

    pub fn disco_hue(&self) -> f32 {
        self.disco_hue
    }

    pub fn fill(&self) -> bool {
        self.fill
    }

    /// Mono mix of `window`, smoothed.
    pub fn get_waveform(&self, window: &SampleWindow) -> Vec<f32> {
        self.smoother.apply(window.to_mono())
    }

    /// Smoothed magnitude spectrum of the mono mix, `frames / 2 + 1` bins.
    pub fn get_spectrum(&mut self, window: &SampleWindow) -> Vec<f32> {
        let spectrum = self.analyzer.magnitudes(&window.to_mono());
        self.smoother.apply(spectrum)
    }

    /// Spectrum with each `(bin, magnitude)` pair rotated by the current
    /// angle plus a random jitter, keeping only the rotated y component.
    ///
    /// The jitter is drawn per call and is not added to the stored angle.
    pub fn get_rotated_spectrum(&mut self, window: &SampleWindow) -> Result<Vec<f32>> {
        let range = SymmetricSpectrumConfig::require(
            self.symmetric.random_angle_range,
            "random_angle_range",
        )?
        .abs();
        let spectrum = self.get_spectrum(window);

        let jitter = if range.is_finite() && range > 0.0 {
            self.rng.random_range(-range..=range)
        } else {
            0.0
        };
        let (sin, cos) = (self.rotation_angle + jitter).to_radians().sin_cos();

        Ok(spectrum
            .into_iter()
            .enumerate()
            .map(|(idx, magnitude)| idx as f32 * sin + magnitude * cos)
            .collect())
    }

    /// Return the stored history, oldest first, each entry scaled by
    /// `decay^age` where the most recent entry has age 0; then push
    /// `new_points` and drop the oldest entries beyond `trail_length`.
    pub fn get_trailing_lines(&mut self, new_points: Vec<f32>) -> Result<Vec<Vec<f32>>> {
        let decay = SymmetricSpectrumConfig::require(
            self.symmetric.trail_decay_factor,
            "trail_decay_factor",
        )?;
        let capacity =
            SymmetricSpectrumConfig::require(self.symmetric.trail_length, "trail_length")?;

        let mut trails = Vec::with_capacity(self.trail_buffer.len());
        let mut factor = 1.0f32;
        for trail in self.trail_buffer.iter().rev() {
            trails.push(trail.iter().map(|v| v * factor).collect::<Vec<f32>>());
            factor *= decay;
        }
        trails.reverse();

        self.trail_buffer.push_back(new_points);
        while self.trail_buffer.len() > capacity {
            self.trail_buffer.pop_front();
        }
        Ok(trails)
    }

    /// Shift the effect color in HSV space by amounts proportional to
    /// `intensity` and return the new RGB triple.
    pub fn update_colors(&mut self, intensity: f32) -> Result<[u8; 3]> {
        let hue_factor = SymmetricSpectrumConfig::require(
            self.symmetric.intensity_to_color_factor,
            "intensity_to_color_factor",
        )?;
        let [r, g, b] = self.last_color;
        let hsv = Color::from_rgba8(r, g, b, 255).to_hsv();
        let shifted = Hsv::new(
            hsv.h + intensity * hue_factor,
            hsv.s + intensity * self.symmetric.saturation_shift_factor,
            hsv.v + intensity * self.symmetric.value_shift_factor,
        );
        let [r, g, b, _] = shifted.to_color().to_rgba8();
        self.last_color = [r, g, b];
        Ok(self.last_color)
    }

    /// Advance the rotation angle by `intensity × rotation_speed_multiplier`,
    /// wrapped into [0, 360).
    pub fn update_rotation(&mut self, intensity: f32) -> Result<f32> {
        let multiplier = SymmetricSpectrumConfig::require(
            self.symmetric.rotation_speed_multiplier,
            "rotation_speed_multiplier",
        )?;
        let angle = (self.rotation_angle + intensity * multiplier).rem_euclid(360.0);
        // rem_euclid rounds tiny negative inputs up to exactly 360.
        self.rotation_angle = if angle.is_finite() && angle < 360.0 {
            angle
        } else {
            0.0
        };
        Ok(self.rotation_angle)
    }

    /// Produce the display data for one tick in `mode`.
    pub fn render(&mut self, mode: VisualizationMode, window: &SampleWindow) -> Result<VisualFrame> {
        match mode {
            VisualizationMode::Waveform => {
                let mut points = self.get_waveform(window);
                let max_abs = points.iter().fold(1.0f32, |acc, v| acc.max(v.abs()));
                for p in &mut points {
                    *p /= max_abs;
                }
                Ok(VisualFrame::Waveform {
                    points,
                    background: self.palette.waveform_background,
                    line: self.palette.line,
                })
            }
            VisualizationMode::Spectrum => {
                let mut y = self.get_spectrum(window);
                let x = (0..y.len()).map(|i| ((i + 1) as f32).log10()).collect();
                let peak = y.iter().copied().fold(f32::MIN, f32::max).max(1e-6);
                for v in &mut y {
                    *v /= peak;
                }
                Ok(VisualFrame::Spectrum {
                    x,
                    y,
                    background: self.palette.spectrum_background,
                    line: self.palette.line,
                    fill: self.fill.then_some(self.palette.fill),
                })
            }
            VisualizationMode::Disco => {
                let intensity = window.intensity();
                let hue = (self.disco_hue + self.disco_speed * intensity).rem_euclid(1.0);
                self.disco_hue = if hue.is_finite() && hue < 1.0 { hue } else { 0.0 };
                Ok(VisualFrame::Disco {
                    background: Hsv::new(self.disco_hue, 1.0, 1.0).to_color(),
                    intensity,
                })
            }
            VisualizationMode::Symmetric => {
                let intensity = window.intensity();
                let spectrum = self.get_rotated_spectrum(window)?;
                let trails = self.get_trailing_lines(spectrum.clone())?;
                let color = self.update_colors(intensity)?;
                let rotation = self.update_rotation(intensity)?;
                Ok(VisualFrame::Symmetric {
                    spectrum,
                    trails,
                    color,
                    rotation,
                })
            }
        }
    }
}
