//! 1-D smoothing filters.
//!
//! Both filters treat the borders by mirror reflection about the edge
//! (`d c b a | a b c d | d c b a`), so the output has the input's length
//! and a constant signal comes back unchanged.

use vizplay_core::{SmoothType, VisualizationConfig};

/// Smoothing settings taken from the visualization config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoother {
    pub enabled: bool,
    pub kind: SmoothType,
    pub window: usize,
}

impl Smoother {
    pub fn from_config(config: &VisualizationConfig) -> Self {
        Self {
            enabled: config.smoothing_enabled,
            kind: config.smooth_type,
            window: config.smoothing_window,
        }
    }

    /// Smooth `data`, or return it untouched when smoothing is disabled or
    /// the series is shorter than the window.
    pub fn apply(&self, data: Vec<f32>) -> Vec<f32> {
        if !self.enabled || self.window == 0 || data.len() < self.window {
            return data;
        }
        match self.kind {
            SmoothType::Uniform => uniform_filter(&data, self.window),
            SmoothType::Gaussian => gaussian_filter(&data, self.window as f32 / 3.0),
        }
    }
}

/// Map an out-of-range index back into `0..len` by mirror reflection.
#[inline]
fn reflect(index: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let m = index.rem_euclid(period);
    if m >= len {
        (period - m - 1) as usize
    } else {
        m as usize
    }
}

/// Moving average of width `size`.
///
/// The window for output `i` spans `i - size/2 ..= i + (size - 1) - size/2`.
pub fn uniform_filter(data: &[f32], size: usize) -> Vec<f32> {
    if data.is_empty() || size <= 1 {
        return data.to_vec();
    }
    let n = data.len();
    let left = (size / 2) as isize;
    let at = |i: isize| data[reflect(i, n)] as f64;

    let mut out = Vec::with_capacity(n);
    // Running sum over the first window, then slide.
    let mut sum: f64 = (0..size as isize).map(|k| at(k - left)).sum();
    out.push((sum / size as f64) as f32);
    for i in 1..n as isize {
        sum += at(i - left + size as isize - 1) - at(i - left - 1);
        out.push((sum / size as f64) as f32);
    }
    out
}

/// Gaussian kernel truncated at four standard deviations, normalized to 1.
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (4.0 * sigma + 0.5) as usize;
    let denom = 2.0 * sigma * sigma;
    let mut weights: Vec<f32> = (-(radius as isize)..=radius as isize)
        .map(|x| (-((x * x) as f32) / denom).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}

/// Gaussian blur with standard deviation `sigma` (in samples).
pub fn gaussian_filter(data: &[f32], sigma: f32) -> Vec<f32> {
    if data.is_empty() || sigma.is_nan() || sigma <= 0.0 {
        return data.to_vec();
    }
    let n = data.len();
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;

    (0..n as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * data[reflect(i + k as isize - radius, n)])
                .sum()
        })
        .collect()
}
