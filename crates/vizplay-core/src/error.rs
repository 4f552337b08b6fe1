//! Error types for VizPlay.

use thiserror::Error;

/// Main error type for VizPlay operations.
#[derive(Error, Debug)]
pub enum VizPlayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl VizPlayError {
    /// Whether this error came from the output device.
    pub fn is_device(&self) -> bool {
        matches!(self, Self::Device(_))
    }
}

/// Result type alias for VizPlay operations.
pub type Result<T> = std::result::Result<T, VizPlayError>;
