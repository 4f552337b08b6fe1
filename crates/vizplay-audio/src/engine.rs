//! Playback engine: transport controls over a shared, lock-protected state.

use crate::output::{CpalBackend, OutputBackend, OutputStream, SilentBackend, StreamSpec};
use crate::render::{RenderHandle, SharedState};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use vizplay_core::{PlayerConfig, Result, SampleBuffer, SampleWindow, VizPlayError};

/// Engine settings fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// Initial linear gain.
    pub volume: f32,
    /// Sleep one buffer period after the final padded chunk.
    pub end_of_stream_wait: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            volume: 1.0,
            end_of_stream_wait: false,
        }
    }
}

impl From<&PlayerConfig> for EngineOptions {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            volume: config.gain(),
            end_of_stream_wait: config.end_of_stream_wait,
        }
    }
}

/// Streaming playback of one decoded track.
///
/// Transport calls come from the control thread; the output stream pulls
/// audio through a `RenderHandle` on its own thread. Both sides serialize on
/// the transport lock. The stream itself is created lazily by `play` and
/// released by `stop` and `load`.
pub struct PlaybackEngine {
    shared: Arc<SharedState>,
    backend: Box<dyn OutputBackend>,
    stream: Mutex<Option<Box<dyn OutputStream>>>,
    last_error: Mutex<Option<String>>,
}

impl PlaybackEngine {
    /// Create an engine that plays through `backend`.
    pub fn new(backend: Box<dyn OutputBackend>, options: EngineOptions) -> Self {
        info!("Initializing playback engine ({} output)", backend.name());
        Self {
            shared: Arc::new(SharedState::new(options.volume, options.end_of_stream_wait)),
            backend,
            stream: Mutex::new(None),
            last_error: Mutex::new(None),
        }
    }

    /// Engine on the system's default output device.
    pub fn with_default_device(options: EngineOptions) -> Self {
        Self::new(Box::new(CpalBackend), options)
    }

    /// Engine on a clocked device that discards audio.
    pub fn silent(options: EngineOptions) -> Self {
        Self::new(Box::new(SilentBackend::default()), options)
    }

    /// Handle the output stream uses to pull audio.
    pub fn render_handle(&self) -> RenderHandle {
        RenderHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Decode `path` and make it the current track.
    ///
    /// On failure the previous track stays loaded and untouched.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let buffer = vizplay_media::load(path).map_err(|e| {
            warn!("Failed to load {}: {}", path.display(), e);
            e
        })?;
        self.load_buffer(buffer);
        Ok(())
    }

    /// Replace the current track with an already decoded buffer.
    pub fn load_buffer(&self, buffer: SampleBuffer) {
        let mut stream = self.stream.lock();
        let old = stream.take();
        {
            let mut transport = self.shared.transport.lock();
            transport.reset();
            transport.buffer = Some(Arc::new(buffer));
            transport.device_error = None;
        }
        Self::close_stream(old);
        drop(stream);
        debug!("Track loaded, position reset");
    }

    /// Start or continue playback. A no-op without a track.
    ///
    /// Returns a `Device` error if the output stream cannot be started or a
    /// stream error was reported since the last call; the transport is left
    /// stopped in both cases.
    pub fn play(&self) -> Result<()> {
        self.start("play")
    }

    /// Continue after `pause`. Same behavior as `play`.
    pub fn resume(&self) -> Result<()> {
        self.start("resume")
    }

    /// Silence output but keep the stream and the position.
    pub fn pause(&self) {
        let mut transport = self.shared.transport.lock();
        transport.playing = false;
        transport.paused = true;
        debug!("Paused at frame {}", transport.position);
    }

    /// Stop playback, rewind, and release the output stream.
    pub fn stop(&self) {
        let mut stream = self.stream.lock();
        let old = stream.take();
        self.shared.transport.lock().reset();
        if old.is_some() {
            info!("Playback stopped");
        }
        Self::close_stream(old);
    }

    /// Set the linear output gain. Not clamped.
    pub fn set_volume(&self, volume: f32) {
        self.shared.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.shared.volume()
    }

    /// Toggle the one-period wait after the last chunk of a track.
    pub fn set_end_of_stream_wait(&self, enabled: bool) {
        self.shared.set_end_of_stream_wait(enabled);
    }

    /// Jump to `fraction` of the track, clamped to [0, 1].
    pub fn seek(&self, fraction: f64) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let mut transport = self.shared.transport.lock();
        let total = transport.total_frames();
        if transport.buffer.is_none() {
            return;
        }
        transport.position = ((total as f64 * fraction).floor() as usize).min(total);
    }

    /// The last `window_size` frames before the play cursor.
    ///
    /// Shorter near the start of the track, empty without a track.
    pub fn get_current_frame(&self, window_size: usize) -> SampleWindow {
        let (buffer, position) = {
            let transport = self.shared.transport.lock();
            match transport.buffer.as_ref() {
                Some(buffer) => (Arc::clone(buffer), transport.position),
                None => return SampleWindow::empty(),
            }
        };
        buffer.window_ending_at(position, window_size)
    }

    /// Cursor position as a fraction of the track; 0 without a track.
    pub fn get_progress(&self) -> f64 {
        let transport = self.shared.transport.lock();
        let total = transport.total_frames();
        if total == 0 {
            return 0.0;
        }
        transport.position as f64 / total as f64
    }

    /// Surface a stream error reported by the output callback.
    ///
    /// Tears the stream down and leaves the transport stopped.
    pub fn check_device(&self) -> Result<()> {
        let pending = self.shared.transport.lock().device_error.take();
        let Some(message) = pending else {
            return Ok(());
        };
        self.stop();
        *self.last_error.lock() = Some(message.clone());
        Err(VizPlayError::Device(message))
    }

    /// The most recent device error, cleared by the next successful start.
    pub fn last_device_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.transport.lock().playing
    }

    pub fn is_paused(&self) -> bool {
        self.shared.transport.lock().paused
    }

    pub fn has_track(&self) -> bool {
        self.shared.transport.lock().buffer.is_some()
    }

    /// Whether an output stream is currently open.
    pub fn has_stream(&self) -> bool {
        self.stream.lock().is_some()
    }

    pub fn position_frames(&self) -> usize {
        self.shared.transport.lock().position
    }

    pub fn total_frames(&self) -> usize {
        self.shared.transport.lock().total_frames()
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.shared
            .transport
            .lock()
            .buffer
            .as_ref()
            .map(|b| b.sample_rate())
    }

    pub fn channels(&self) -> Option<u16> {
        self.shared
            .transport
            .lock()
            .buffer
            .as_ref()
            .map(|b| b.channels())
    }

    /// Track length in seconds; 0 without a track.
    pub fn duration_secs(&self) -> f64 {
        self.shared
            .transport
            .lock()
            .buffer
            .as_ref()
            .map_or(0.0, |b| b.duration_secs())
    }

    fn start(&self, action: &str) -> Result<()> {
        self.check_device()?;

        let mut stream = self.stream.lock();
        let spec = {
            let mut transport = self.shared.transport.lock();
            let Some(buffer) = transport.buffer.as_ref() else {
                return Ok(());
            };
            let spec = StreamSpec {
                sample_rate: buffer.sample_rate(),
                channels: buffer.channels(),
            };
            transport.playing = true;
            transport.paused = false;
            spec
        };

        if stream.is_some() {
            debug!("{}: stream already running", action);
            return Ok(());
        }

        match self.backend.open(spec, self.render_handle()) {
            Ok(opened) => {
                *stream = Some(opened);
                *self.last_error.lock() = None;
                info!(
                    "{}: output started ({} ch @ {} Hz)",
                    action, spec.channels, spec.sample_rate
                );
                Ok(())
            }
            Err(e) => {
                self.shared.transport.lock().reset();
                error!("{}: failed to start output: {}", action, e);
                *self.last_error.lock() = Some(e.to_string());
                if e.is_device() {
                    Err(e)
                } else {
                    Err(VizPlayError::Device(e.to_string()))
                }
            }
        }
    }

    fn close_stream(stream: Option<Box<dyn OutputStream>>) {
        if let Some(mut stream) = stream {
            if let Err(e) = stream.stop() {
                warn!("Error while stopping output stream: {}", e);
            }
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        let old = self.stream.get_mut().take();
        Self::close_stream(old);
    }
}
