//! Magnitude spectrum of a real signal.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f32::consts::PI;
use vizplay_core::WindowFunction;

/// Symmetric Hann coefficient `n` of a window of `size` points.
#[inline]
fn hann(n: usize, size: usize) -> f32 {
    if size < 2 {
        return 1.0;
    }
    0.5 * (1.0 - (2.0 * PI * n as f32 / (size - 1) as f32).cos())
}

/// Computes `|rfft(x)|`: `len / 2 + 1` bin magnitudes for an input of `len`
/// samples, bin 0 being DC. Plans are cached per length by the planner.
pub struct SpectrumAnalyzer {
    planner: FftPlanner<f32>,
    window: WindowFunction,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new(window: WindowFunction) -> Self {
        Self {
            planner: FftPlanner::new(),
            window,
            scratch: Vec::new(),
        }
    }

    pub fn window_function(&self) -> WindowFunction {
        self.window
    }

    /// Magnitude spectrum of `signal`. Empty input gives an empty spectrum.
    pub fn magnitudes(&mut self, signal: &[f32]) -> Vec<f32> {
        let n = signal.len();
        if n == 0 {
            return Vec::new();
        }

        let window = self.window;
        self.scratch.clear();
        self.scratch.extend(signal.iter().enumerate().map(|(i, &s)| {
            let w = match window {
                WindowFunction::None => 1.0,
                WindowFunction::Hann => hann(i, n),
            };
            Complex::new(s * w, 0.0)
        }));

        let fft = self.planner.plan_fft_forward(n);
        fft.process(&mut self.scratch);

        self.scratch[..n / 2 + 1].iter().map(|c| c.norm()).collect()
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new(WindowFunction::default())
    }
}
