//! VizPlay Media - audio file decoding
//!
//! This crate handles:
//! - Opening the first decodable track of a file
//! - Decoding whole files to interleaved f32 PCM (`SampleBuffer`)
//!
//! Decoding goes through symphonia; no resampling is done, the file's own
//! sample rate is kept.

pub mod decoder;

pub use decoder::{load, AudioDecoder};

/// File extensions offered by the player's file picker.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg", "m4a", "aac", "aiff"];

/// Whether a path has one of the supported audio extensions.
pub fn is_supported(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
