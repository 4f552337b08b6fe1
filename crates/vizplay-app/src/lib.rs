//! VizPlay App - headless player front end
//!
//! - `Args`: command line
//! - `Playlist` / `Controller`: track list and transport logic
//! - `session::run`: the visualization tick loop

pub mod args;
pub mod controller;
pub mod playlist;
pub mod session;

pub use args::Args;
pub use controller::{Controller, TickOutcome};
pub use playlist::Playlist;
pub use session::{ModeCycle, SessionOptions, SessionStats};
