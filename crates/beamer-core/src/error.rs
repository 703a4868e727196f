//! Error types for beamer-tools.
//!
//! These cover configuration and process-level failures only. Failures of a
//! tracker API call are reported through [`crate::Envelope`] instead.

use thiserror::Error;

/// Main error type for beamer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport could not be started or failed while serving
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for beamer operations.
pub type Result<T> = std::result::Result<T, Error>;
