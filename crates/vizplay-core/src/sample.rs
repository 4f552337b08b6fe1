//! Decoded PCM sample storage.
//!
//! Samples are kept interleaved (`[frame][channel]` flattened) as f32 in
//! roughly [-1, 1]. A `SampleBuffer` is immutable once built; playback and
//! visualization share it behind an `Arc`.

use crate::error::{Result, VizPlayError};
use std::sync::Arc;

/// Immutable decoded audio with a fixed channel count and sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

/// Shared, reference-counted sample buffer.
pub type SharedSampleBuffer = Arc<SampleBuffer>;

impl SampleBuffer {
    /// Build a buffer from interleaved samples.
    ///
    /// Fails if `channels` is zero or the sample count is not a whole
    /// number of frames.
    pub fn from_interleaved(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(VizPlayError::InvalidParameter(
                "sample buffer needs at least one channel".into(),
            ));
        }
        if samples.len() % channels as usize != 0 {
            return Err(VizPlayError::InvalidParameter(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Build a buffer from per-frame channel vectors.
    ///
    /// Every frame must carry the same number of channels.
    pub fn from_frames(frames: &[Vec<f32>], sample_rate: u32) -> Result<Self> {
        let channels = frames.first().map_or(1, |f| f.len());
        if channels == 0 || channels > u16::MAX as usize {
            return Err(VizPlayError::InvalidParameter(format!(
                "unsupported channel count {channels}"
            )));
        }
        let mut samples = Vec::with_capacity(frames.len() * channels);
        for (index, frame) in frames.iter().enumerate() {
            if frame.len() != channels {
                return Err(VizPlayError::InvalidParameter(format!(
                    "frame {index} has {} channels, expected {channels}",
                    frame.len()
                )));
            }
            samples.extend_from_slice(frame);
        }
        Self::from_interleaved(samples, channels as u16, sample_rate)
    }

    /// Number of interleaved channels.
    #[inline]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz, as read from the source file.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Whether the buffer holds no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// All samples, interleaved.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// One frame (one sample per channel).
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let ch = self.channels as usize;
        self.samples.get(index * ch..(index + 1) * ch)
    }

    /// Interleaved samples for frames `[start, end)`, clamped to the buffer.
    pub fn frames(&self, start: usize, end: usize) -> &[f32] {
        let total = self.frame_count();
        let end = end.min(total);
        let start = start.min(end);
        let ch = self.channels as usize;
        &self.samples[start * ch..end * ch]
    }

    /// Copy of the most recent `window_size` frames ending at `end`.
    pub fn window_ending_at(&self, end: usize, window_size: usize) -> SampleWindow {
        let end = end.min(self.frame_count());
        let start = end.saturating_sub(window_size);
        SampleWindow {
            samples: self.frames(start, end).to_vec(),
            channels: self.channels,
        }
    }
}

/// A short run of interleaved frames handed to the visualizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleWindow {
    samples: Vec<f32>,
    channels: u16,
}

impl SampleWindow {
    /// Create a window from interleaved samples. Trailing samples that do
    /// not fill a whole frame are dropped.
    pub fn new(mut samples: Vec<f32>, channels: u16) -> Self {
        let channels = channels.max(1);
        let whole = samples.len() - samples.len() % channels as usize;
        samples.truncate(whole);
        Self { samples, channels }
    }

    /// A single-channel window.
    pub fn mono(samples: Vec<f32>) -> Self {
        Self {
            samples,
            channels: 1,
        }
    }

    /// An empty window.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn channels(&self) -> u16 {
        self.channels.max(1)
    }

    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels() as usize
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Collapse to mono by averaging channels per frame.
    pub fn to_mono(&self) -> Vec<f32> {
        let ch = self.channels() as usize;
        if ch == 1 {
            return self.samples.clone();
        }
        self.samples
            .chunks_exact(ch)
            .map(|frame| frame.iter().sum::<f32>() / ch as f32)
            .collect()
    }

    /// Mean absolute amplitude of the mono mix, 0 for an empty window.
    pub fn intensity(&self) -> f32 {
        let mono = self.to_mono();
        if mono.is_empty() {
            return 0.0;
        }
        mono.iter().map(|s| s.abs()).sum::<f32>() / mono.len() as f32
    }
}

impl From<Vec<f32>> for SampleWindow {
    fn from(samples: Vec<f32>) -> Self {
        Self::mono(samples)
    }
}
