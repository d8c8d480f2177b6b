//! Error types for the memento library.
//!
//! This module provides custom error types using `thiserror` so callers can
//! tell client mistakes apart from archive failures.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Message;

/// Errors that can occur while querying the archive or merging contacts.
#[derive(Error, Debug)]
pub enum MementoError {
    /// A file could not be opened or read
    #[error("File I/O error on {}: {source}", path.display())]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A log line did not decode as a message
    #[error("file: {}:{line}: {source}", file.display())]
    Decode {
        /// Log file being scanned
        file: PathBuf,
        /// 0-based index of the offending line
        line: usize,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// The `limit` query parameter is not an integer
    #[error("Invalid limit: {0:?}")]
    InvalidLimit(String),

    /// A contacts source could not be opened or parsed during a merge
    #[error("Error reading contacts file {}: {source}", file.display())]
    ContactSource {
        /// Offending source file
        file: PathBuf,
        /// Why the source was rejected
        #[source]
        source: Box<MementoError>,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl MementoError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the failure was caused by caller input rather than the archive.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidLimit(_))
    }
}

/// A scan that failed part way through.
///
/// Carries the matches gathered before the failure so the caller decides
/// whether to surface them.
#[derive(Error, Debug)]
#[error("scan aborted after {} matches: {source}", gathered.len())]
pub struct PartialScan {
    /// Messages accepted before the failure, in file order
    pub gathered: Vec<Message>,
    /// The failure that stopped the scan
    #[source]
    pub source: MementoError,
}

impl From<PartialScan> for MementoError {
    fn from(err: PartialScan) -> Self {
        err.source
    }
}

/// Convenience type alias for Result with `MementoError`
pub type Result<T> = std::result::Result<T, MementoError>;

impl From<anyhow::Error> for MementoError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<config::ConfigError> for MementoError {
    fn from(err: config::ConfigError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
