//! VizPlay Core - Foundation types for the audio visualizer
//!
//! This crate provides the types shared by the player and the visualizer:
//! - Decoded sample storage (SampleBuffer, SampleWindow)
//! - Color and HSV conversion
//! - Typed configuration
//! - Error types

pub mod color;
pub mod config;
pub mod error;
pub mod sample;

pub use color::{Color, Hsv};
pub use config::{
    Config, DiscoConfig, PlayerConfig, SmoothType, SymmetricSpectrumConfig, ThemeConfig,
    UiConfig, VisualizationConfig, VisualizationMode, WindowFunction,
};
pub use error::{Result, VizPlayError};
pub use sample::{SampleBuffer, SampleWindow, SharedSampleBuffer};
