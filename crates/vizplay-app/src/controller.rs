//! Transport controller: the playlist plus the play/pause/next/prev logic
//! a player window would wire to its buttons.

use crate::playlist::Playlist;
use std::path::PathBuf;
use tracing::{info, warn};
use vizplay_audio::PlaybackEngine;
use vizplay_core::Result;

/// What happened on a controller tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing changed.
    Continue,
    /// The track ended and playback moved on to this index.
    Advanced(usize),
    /// The last track ended and looping is off.
    Finished,
}

pub struct Controller {
    engine: PlaybackEngine,
    playlist: Playlist,
    volume_percent: u8,
    playing: bool,
}

impl Controller {
    pub fn new(engine: PlaybackEngine, volume_percent: u8) -> Self {
        Self {
            engine,
            playlist: Playlist::new(),
            volume_percent: volume_percent.min(100),
            playing: false,
        }
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Whether the user-facing state is "playing".
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume_percent(&self) -> u8 {
        self.volume_percent
    }

    /// Append tracks; the first one is loaded if nothing is selected yet.
    pub fn add_tracks<I: IntoIterator<Item = PathBuf>>(&mut self, tracks: I) -> Result<()> {
        let before = self.playlist.len();
        self.playlist.extend(tracks);
        info!("Playlist: {} tracks", self.playlist.len());
        if self.playlist.current().is_none() && self.playlist.len() > before {
            self.load_track(0)?;
        }
        Ok(())
    }

    /// Load track `index`, apply the volume and leave it stopped.
    /// Out-of-range indices are ignored.
    pub fn load_track(&mut self, index: usize) -> Result<()> {
        let Some(path) = self.playlist.get(index).map(PathBuf::from) else {
            return Ok(());
        };
        self.engine.load(&path)?;
        self.playlist.select(index);
        self.engine.set_volume(f32::from(self.volume_percent) / 100.0);
        self.playing = false;
        info!("Loaded track {}: {}", index + 1, path.display());
        Ok(())
    }

    /// Pause when playing, resume when paused, otherwise start.
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.playing {
            self.engine.pause();
        } else if self.engine.is_paused() {
            self.engine.resume()?;
        } else {
            if self.playlist.current().is_none() && !self.playlist.is_empty() {
                self.load_track(0)?;
            }
            self.engine.play()?;
        }
        self.playing = !self.playing;
        Ok(())
    }

    /// Stop and rewind.
    pub fn stop(&mut self) {
        self.engine.stop();
        self.engine.seek(0.0);
        self.playing = false;
    }

    /// Load and start the next track, wrapping around.
    pub fn next(&mut self) -> Result<()> {
        match self.playlist.next_index() {
            Some(index) => self.start_track(index),
            None => Ok(()),
        }
    }

    /// Load and start the previous track, wrapping around.
    pub fn prev(&mut self) -> Result<()> {
        match self.playlist.prev_index() {
            Some(index) => self.start_track(index),
            None => Ok(()),
        }
    }

    /// Jump straight to track `index` unless it is already current.
    pub fn play_index(&mut self, index: usize) -> Result<()> {
        if self.playlist.current() == Some(index) || index >= self.playlist.len() {
            return Ok(());
        }
        self.start_track(index)
    }

    pub fn seek_fraction(&self, fraction: f64) {
        self.engine.seek(fraction);
    }

    /// Set the volume in percent, clamped to 0-100.
    pub fn set_volume_percent(&mut self, percent: i32) {
        self.volume_percent = percent.clamp(0, 100) as u8;
        self.engine.set_volume(f32::from(self.volume_percent) / 100.0);
    }

    /// Poll the engine once per visualization tick.
    ///
    /// Surfaces device errors, and when the engine has reset itself at the
    /// end of a track, moves on to the next loadable one.
    pub fn on_tick(&mut self, repeat: bool) -> Result<TickOutcome> {
        if let Err(e) = self.engine.check_device() {
            self.playing = false;
            return Err(e);
        }
        if !self.playing || self.engine.is_playing() || self.engine.is_paused() {
            return Ok(TickOutcome::Continue);
        }

        info!("Track finished");
        self.playing = false;
        if self.playlist.at_end() && !repeat {
            return Ok(TickOutcome::Finished);
        }
        self.advance()
    }

    /// Start the next track, skipping ones that fail to load.
    fn advance(&mut self) -> Result<TickOutcome> {
        let len = self.playlist.len();
        let start = self.playlist.current().map_or(0, |current| current + 1);
        for offset in 0..len {
            let index = (start + offset) % len;
            match self.start_track(index) {
                Ok(()) => return Ok(TickOutcome::Advanced(index)),
                Err(e) if e.is_device() => return Err(e),
                Err(e) => warn!("Skipping track {}: {}", index + 1, e),
            }
        }
        Ok(TickOutcome::Finished)
    }

    fn start_track(&mut self, index: usize) -> Result<()> {
        self.load_track(index)?;
        self.toggle_play_pause()
    }
}
