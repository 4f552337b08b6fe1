//! Ordered track list with a cursor.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<PathBuf>,
    current: Option<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend<I: IntoIterator<Item = PathBuf>>(&mut self, tracks: I) {
        self.tracks.extend(tracks);
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[PathBuf] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.tracks.get(index).map(PathBuf::as_path)
    }

    /// Index of the current track; `None` until one is selected.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.and_then(|i| self.get(i))
    }

    /// Select `index`. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// Index after the current one, wrapping to the start.
    pub fn next_index(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        Some(self.current.map_or(0, |i| (i + 1) % self.tracks.len()))
    }

    /// Index before the current one, wrapping to the end.
    pub fn prev_index(&self) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        Some(self.current.map_or(len - 1, |i| (i + len - 1) % len))
    }

    /// Whether the current track is the last one.
    pub fn at_end(&self) -> bool {
        self.current.is_some_and(|i| i + 1 >= self.tracks.len())
    }
}
