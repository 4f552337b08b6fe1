//! Whole-file audio decoder using symphonia.

use std::fmt::Display;
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer as PcmBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};
use vizplay_core::{Result, SampleBuffer, VizPlayError};

/// Decode an audio file into an interleaved f32 `SampleBuffer`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SampleBuffer> {
    AudioDecoder::open(path)?.decode_all()
}

/// Audio decoder bound to the first decodable track of a file.
pub struct AudioDecoder {
    path: PathBuf,
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: Option<u32>,
    channels: Option<u16>,
}

impl AudioDecoder {
    /// Open an audio file for decoding.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let format = open_format(path)?;
        let track = first_audio_track(format.as_ref(), path)?;
        let params = track.codec_params.clone();
        let track_id = track.id;

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| VizPlayError::Decode(format!("Unsupported codec: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            format,
            decoder,
            track_id,
            sample_rate: params.sample_rate,
            channels: params.channels.map(|c| c.count() as u16),
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode every packet of the track.
    ///
    /// Corrupt packets are skipped; the stream ends at EOF or when the
    /// format reader asks for a reset.
    pub fn decode_all(mut self) -> Result<SampleBuffer> {
        let mut samples: Vec<f32> = Vec::new();
        let mut skipped = 0usize;

        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    return Err(VizPlayError::Decode(format!(
                        "Failed reading {}: {}",
                        self.path.display(),
                        e
                    )))
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    skipped += 1;
                    debug!("Skipping corrupt packet: {}", e);
                    continue;
                }
                Err(SymphoniaError::IoError(_)) => {
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    return Err(VizPlayError::Decode(format!(
                        "Failed decoding {}: {}",
                        self.path.display(),
                        e
                    )))
                }
            };

            let spec = *decoded.spec();
            merge_param(&mut self.sample_rate, spec.rate, "sample rate", &self.path)?;
            merge_param(
                &mut self.channels,
                spec.channels.count() as u16,
                "channel count",
                &self.path,
            )?;

            if decoded.frames() == 0 {
                continue;
            }

            let mut pcm = PcmBuffer::<f32>::new(decoded.capacity() as u64, spec);
            pcm.copy_interleaved_ref(decoded);
            samples.extend_from_slice(pcm.samples());
        }

        if skipped > 0 {
            warn!("Skipped {} undecodable packets in {}", skipped, self.path.display());
        }

        let (Some(channels), Some(sample_rate)) = (self.channels, self.sample_rate) else {
            return Err(VizPlayError::Decode(format!(
                "No audio frames in {}",
                self.path.display()
            )));
        };

        let buffer = SampleBuffer::from_interleaved(samples, channels, sample_rate)
            .map_err(|e| VizPlayError::Decode(e.to_string()))?;
        info!(
            "Decoded {}: {} frames, {} ch @ {} Hz ({:.2}s)",
            self.path.display(),
            buffer.frame_count(),
            channels,
            sample_rate,
            buffer.duration_secs()
        );
        Ok(buffer)
    }
}

/// Open a file and detect its container format.
fn open_format(path: &Path) -> Result<Box<dyn FormatReader>> {
    let file = File::open(path).map_err(|e| {
        VizPlayError::Decode(format!("Cannot open {}: {}", path.display(), e))
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let detected = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| {
            VizPlayError::Decode(format!("Unsupported format {}: {}", path.display(), e))
        })?;

    Ok(detected.format)
}

/// First track with a known codec.
fn first_audio_track<'a>(format: &'a dyn FormatReader, path: &Path) -> Result<&'a Track> {
    format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            VizPlayError::Decode(format!("No supported audio tracks in {}", path.display()))
        })
}

/// Record a stream parameter from a decoded packet.
///
/// The first value seen is kept; a later packet that disagrees is a decode
/// error, since its samples cannot be interleaved with the earlier ones.
fn merge_param<T>(stored: &mut Option<T>, actual: T, what: &str, path: &Path) -> Result<()>
where
    T: Copy + PartialEq + Display,
{
    match *stored {
        None => {
            *stored = Some(actual);
            Ok(())
        }
        Some(expected) if expected == actual => Ok(()),
        Some(expected) => Err(VizPlayError::Decode(format!(
            "{} changed mid-stream in {}: {} -> {}",
            what,
            path.display(),
            expected,
            actual
        ))),
    }
}
