//! Centralized error types for noticeboard.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the noticeboard library.
#[derive(Error, Debug)]
pub enum BoardError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified export file does not exist.
    #[error("Announcement export not found: {0}")]
    FileNotFound(PathBuf),

    /// The export file could not be decoded as an announcement list.
    #[error("Invalid announcement export '{path}': {reason}")]
    InvalidExport { path: PathBuf, reason: String },

    /// The Airtable connection is missing required settings.
    #[error("Record store not configured: {0}")]
    StoreNotConfigured(String),

    /// Transport-level failure talking to the record store.
    #[error("Record store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The record store answered with a non-success status.
    #[error("Record store API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// A configuration value could not be used.
    #[error("Config error: {0}")]
    Config(String),
}

/// Convenience alias for `Result<T, BoardError>`.
pub type Result<T> = std::result::Result<T, BoardError>;

/// Helper to convert a bare `std::io::Error` together with a path.
impl BoardError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `BoardError`
/// when no path context is available (rare, prefer `BoardError::io`).
impl From<std::io::Error> for BoardError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
