//! Integration test crate for VizPlay.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the vizplay crates to verify they work together.

#[cfg(test)]
mod audio;

#[cfg(test)]
mod visualization;

#[cfg(test)]
mod pipeline;
