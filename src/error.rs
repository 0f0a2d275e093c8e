//! Crate-wide error type.

use hdrhistogram::{CreationError, RecordError};
use std::{io, path::PathBuf};

/// Errors returned by this crate.
///
/// Malformed log lines are not errors: they are dropped during ingestion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a log or config file cannot be read.
    #[error("could not read {path}: {source}")]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Returned when the interchange file cannot be written.
    #[error("could not write {path}: {source}")]
    Write {
        /// The file that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Returned when a bin-count request is neither `auto` nor a positive integer.
    #[error("invalid bin count '{0}': must be a positive integer or \"auto\"")]
    InvalidBinCount(String),

    /// Returned when a parameter name in an interchange file is not recognized.
    #[error("unknown parameter name '{0}'")]
    UnknownParameter(String),

    /// Returned when an interchange file does not follow the expected layout.
    #[error("malformed interchange file at line {line}: {reason}")]
    Interchange {
        /// 1-based line number where the problem was detected.
        line: usize,
        /// What was expected.
        reason: String,
    },

    /// Returned when a summary histogram cannot be created.
    #[error("histogram configuration error: {0}")]
    HistogramConfig(#[from] CreationError),

    /// Returned when a value cannot be recorded in a summary histogram.
    #[error("histogram record error: {0}")]
    HistogramRecord(#[from] RecordError),
}

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
