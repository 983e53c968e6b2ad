//! Error types for kgpath operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all kgpath crates. Uses `thiserror` for derive macros.
//!
//! Only two kinds of failure ever reach a caller of an extraction: connectivity
//! problems (including timeouts) and configuration problems detected at
//! startup. Missing entities and malformed edges are not errors.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in kgpath operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// The file that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Configuration error (missing credentials, bad config file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The graph store could not be reached or rejected the query.
    #[error("Graph store error: {0}")]
    Connectivity(String),

    /// The graph store did not answer in time.
    #[error("Graph store timed out after {0:?}")]
    Timeout(Duration),

    /// Content not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A higher-level operation failed.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connectivity error.
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create an operation error.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Wrap an I/O error with the path it occurred on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for failures talking to the graph store, timeouts included.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_) | Self::Timeout(_))
    }

    /// True for configuration failures.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias using kgpath's Error type.
pub type Result<T> = std::result::Result<T, Error>;
