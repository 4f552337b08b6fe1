//! Shared transport state and the real-time render path.
//!
//! The control thread and the output callback share one `Transport` behind a
//! single mutex. The callback holds that lock only long enough to read the
//! cursor and advance it; the sample copy and gain happen after release.
//! Volume lives outside the lock as the bit pattern of an f32.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vizplay_core::SharedSampleBuffer;

/// Transport state guarded by the engine lock.
#[derive(Debug, Default)]
pub(crate) struct Transport {
    pub buffer: Option<SharedSampleBuffer>,
    /// Next frame to play, `0 <= position <= frame_count`.
    pub position: usize,
    pub playing: bool,
    pub paused: bool,
    /// Error raised on the callback side, surfaced on the next control call.
    pub device_error: Option<String>,
}

impl Transport {
    pub fn total_frames(&self) -> usize {
        self.buffer.as_ref().map_or(0, |b| b.frame_count())
    }

    /// Back to the stopped state: not playing, not paused, cursor at 0.
    pub fn reset(&mut self) {
        self.playing = false;
        self.paused = false;
        self.position = 0;
    }
}

pub(crate) struct SharedState {
    pub transport: Mutex<Transport>,
    volume_bits: AtomicU32,
    end_of_stream_wait: AtomicBool,
}

impl SharedState {
    pub fn new(volume: f32, end_of_stream_wait: bool) -> Self {
        Self {
            transport: Mutex::new(Transport::default()),
            volume_bits: AtomicU32::new(volume.to_bits()),
            end_of_stream_wait: AtomicBool::new(end_of_stream_wait),
        }
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set_volume(&self, volume: f32) {
        self.volume_bits.store(volume.to_bits(), Ordering::Relaxed);
    }

    pub fn set_end_of_stream_wait(&self, enabled: bool) {
        self.end_of_stream_wait.store(enabled, Ordering::Relaxed);
    }
}

/// What one render call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    /// Nothing loaded or not playing; the buffer was zeroed.
    Silence,
    /// A full chunk of audio was written.
    Playing,
    /// The track ran out inside this chunk; the tail was zero-padded and the
    /// transport reset to the start.
    EndOfStream,
}

/// Handle given to output streams so they can pull audio.
///
/// Cheap to clone and safe to move onto the audio callback thread.
#[derive(Clone)]
pub struct RenderHandle {
    pub(crate) shared: Arc<SharedState>,
}

impl RenderHandle {
    /// Fill `out` with interleaved frames for a stream of `channels` channels.
    pub fn fill(&self, out: &mut [f32], channels: usize) -> FillStatus {
        let channels = channels.max(1);
        let frames = out.len() / channels;

        let (buffer, start, available) = {
            let mut transport = self.shared.transport.lock();
            let buffer = transport
                .buffer
                .as_ref()
                .filter(|b| transport.playing && b.channels() as usize == channels)
                .cloned();
            let Some(buffer) = buffer else {
                drop(transport);
                out.fill(0.0);
                return FillStatus::Silence;
            };

            let start = transport.position;
            let available = buffer.frame_count().saturating_sub(start).min(frames);
            if available < frames {
                transport.playing = false;
                transport.position = 0;
            } else {
                transport.position = start + frames;
            }
            (buffer, start, available)
        };

        let volume = self.shared.volume();
        let src = buffer.frames(start, start + available);
        for (dst, sample) in out.iter_mut().zip(src) {
            *dst = sample * volume;
        }
        out[src.len()..].fill(0.0);

        if available < frames {
            if self.shared.end_of_stream_wait.load(Ordering::Relaxed) && buffer.sample_rate() > 0 {
                std::thread::sleep(Duration::from_secs_f64(
                    frames as f64 / buffer.sample_rate() as f64,
                ));
            }
            return FillStatus::EndOfStream;
        }
        FillStatus::Playing
    }

    /// Record a fatal stream error from the callback side.
    ///
    /// Playback stops immediately; the error is returned by the next
    /// `play`, `resume` or `check_device` call on the engine.
    pub fn report_device_error(&self, message: impl Into<String>) {
        let mut transport = self.shared.transport.lock();
        transport.playing = false;
        transport.paused = false;
        transport.device_error = Some(message.into());
    }
}
