//! trackled: indicator LED controller for GS-series GPS trackers.

pub mod config;
pub mod error;
pub mod hardware;
pub mod led;
pub mod scenario;
pub mod ticker;

pub use error::TrackledError;
