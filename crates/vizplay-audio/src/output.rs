//! Output device backends.
//!
//! A backend opens a stream for a given sample rate and channel count and
//! drives a `RenderHandle` from its own thread at its own cadence.
//! - `CpalBackend`: the system's default output device
//! - `SilentBackend`: a clocked offline device that discards audio
//! - `NullBackend`: never pulls audio; callers drive the handle themselves

use crate::render::RenderHandle;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info};
use vizplay_core::{Result, VizPlayError};

/// Stream parameters, taken from the loaded sample buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Opens output streams.
pub trait OutputBackend {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Open and start a stream that pulls audio through `render`.
    fn open(&self, spec: StreamSpec, render: RenderHandle) -> Result<Box<dyn OutputStream>>;
}

/// A running output stream. Dropping it releases the device.
pub trait OutputStream {
    /// Stop pulling audio.
    fn stop(&mut self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// cpal
// ---------------------------------------------------------------------------

/// Default host, default output device, f32 samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalBackend;

struct CpalStream {
    stream: cpal::Stream,
}

impl OutputBackend for CpalBackend {
    fn name(&self) -> &str {
        "cpal"
    }

    fn open(&self, spec: StreamSpec, render: RenderHandle) -> Result<Box<dyn OutputStream>> {
        use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| VizPlayError::Device("No default output device available".into()))?;
        if let Ok(name) = device.name() {
            info!("Using output device: {}", name);
        }

        let config = cpal::StreamConfig {
            channels: spec.channels,
            sample_rate: cpal::SampleRate(spec.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let channels = spec.channels as usize;
        let data_handle = render.clone();
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    data_handle.fill(data, channels);
                },
                move |err| {
                    error!("Audio stream error: {err}");
                    render.report_device_error(err.to_string());
                },
                None,
            )
            .map_err(|e| VizPlayError::Device(format!("Failed to build output stream: {e}")))?;

        stream
            .play()
            .map_err(|e| VizPlayError::Device(format!("Failed to start stream: {e}")))?;

        Ok(Box::new(CpalStream { stream }))
    }
}

impl OutputStream for CpalStream {
    fn stop(&mut self) -> Result<()> {
        use cpal::traits::StreamTrait;

        self.stream
            .pause()
            .map_err(|e| VizPlayError::Device(format!("Failed to pause stream: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Silent (clocked, headless)
// ---------------------------------------------------------------------------

/// Pulls `period_frames` frames every buffer period on a background thread
/// and throws them away. Keeps transport timing realistic without hardware.
#[derive(Debug, Clone, Copy)]
pub struct SilentBackend {
    period_frames: usize,
}

impl SilentBackend {
    pub fn new(period_frames: usize) -> Self {
        Self {
            period_frames: period_frames.max(1),
        }
    }
}

impl Default for SilentBackend {
    fn default() -> Self {
        Self::new(512)
    }
}

struct SilentStream {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl OutputBackend for SilentBackend {
    fn name(&self) -> &str {
        "silent"
    }

    fn open(&self, spec: StreamSpec, render: RenderHandle) -> Result<Box<dyn OutputStream>> {
        if spec.sample_rate == 0 {
            return Err(VizPlayError::Device("Sample rate must be non-zero".into()));
        }
        let channels = spec.channels.max(1) as usize;
        let period_frames = self.period_frames;
        let period = Duration::from_secs_f64(period_frames as f64 / spec.sample_rate as f64);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let thread = std::thread::Builder::new()
            .name("vizplay-silent-output".into())
            .spawn(move || {
                let mut scratch = vec![0.0f32; period_frames * channels];
                loop {
                    match stop_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => {
                            render.fill(&mut scratch, channels);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| VizPlayError::Device(format!("Failed to spawn output thread: {e}")))?;

        debug!(
            "Silent output running: {} frames every {:.1} ms",
            period_frames,
            period.as_secs_f64() * 1000.0
        );
        Ok(Box::new(SilentStream {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        }))
    }
}

impl OutputStream for SilentStream {
    fn stop(&mut self) -> Result<()> {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| VizPlayError::Device("Silent output thread panicked".into()))?;
        }
        Ok(())
    }
}

impl Drop for SilentStream {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

// ---------------------------------------------------------------------------
// Null (manually driven)
// ---------------------------------------------------------------------------

/// Stream bookkeeping shared between a `NullBackend` and its streams.
#[derive(Debug, Default)]
pub struct NullStats {
    opened: AtomicUsize,
    live: AtomicUsize,
}

impl NullStats {
    /// Streams opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Streams currently alive.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Opens streams that never pull audio. The caller drives the engine's
/// `RenderHandle` directly.
#[derive(Debug, Default, Clone)]
pub struct NullBackend {
    stats: Arc<NullStats>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Arc<NullStats> {
        Arc::clone(&self.stats)
    }
}

struct NullStream {
    stats: Arc<NullStats>,
}

impl OutputBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    fn open(&self, _spec: StreamSpec, _render: RenderHandle) -> Result<Box<dyn OutputStream>> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        self.stats.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(NullStream {
            stats: Arc::clone(&self.stats),
        }))
    }
}

impl OutputStream for NullStream {
    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Drop for NullStream {
    fn drop(&mut self) {
        self.stats.live.fetch_sub(1, Ordering::SeqCst);
    }
}
