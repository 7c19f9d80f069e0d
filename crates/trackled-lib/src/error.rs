//! Unified error type for the trackled-lib crate.
//!
//! The LED controller itself never fails; [`TrackledError`] covers the
//! surrounding plumbing (config persistence, scenario loading). `From` impls
//! allow `?` to propagate I/O errors without manual wrapping.

use std::fmt;

/// Unified error type for trackled-lib operations.
#[derive(Debug)]
pub enum TrackledError {
    /// Standard I/O error (file read/write, config persistence).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
    /// Scenario parsing or validation error.
    Scenario(String),
}

impl fmt::Display for TrackledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackledError::Io(e) => write!(f, "I/O error: {e}"),
            TrackledError::Config(e) => write!(f, "Config error: {e}"),
            TrackledError::Scenario(e) => write!(f, "Scenario error: {e}"),
        }
    }
}

impl std::error::Error for TrackledError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackledError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrackledError {
    fn from(e: std::io::Error) -> Self {
        TrackledError::Io(e)
    }
}

/// Crate-level Result alias using [`TrackledError`].
pub type Result<T> = std::result::Result<T, TrackledError>;
