//! Error types for the embedded server lifecycle
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Lifecycle Error Enum ==
/// Errors raised while bringing the embedded server up.
///
/// A startup failure is fatal: the hosting process is expected to abort its
/// initialization instead of retrying.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The embedded server could not be started (bind failure, missing binary, ...)
    #[error("Failed to start local embedded redis server on port {port}")]
    StartupFailure {
        /// Port the server was asked to bind
        port: u16,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },
}

impl LifecycleError {
    /// Kind of the underlying I/O failure.
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            LifecycleError::StartupFailure { source, .. } => source.kind(),
        }
    }
}

// == Config Error Enum ==
/// Errors raised while loading property files.
///
/// Property lookups themselves never fail; this only covers file sources.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The property file could not be read
    #[error("Cannot read property file {}", path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The property file is not valid JSON
    #[error("Invalid property file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The top-level JSON value is not an object
    #[error("Property document must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

// == Result Type Alias ==
/// Convenience Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;
