//! Error types for the ring notification bridge
//!
//! Only launch failures, unknown tools and malformed tool arguments are
//! surfaced to the MCP caller. Anomalies around the handoff artifact are
//! absorbed into a successful outcome (see [`crate::types::ArtifactOutcome`]).

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ring operations
#[derive(Error, Debug)]
pub enum RingError {
    /// The presentation process could not be started
    #[error("Failed to spawn notification ({}): {source}", program.display())]
    LaunchFailure {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A tool other than `ring` was requested
    #[error("Unknown tool: {0}")]
    UnsupportedOperation(String),

    /// Tool arguments did not match the input schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client configuration could not be registered
    #[error("Setup failed: {0}")]
    Setup(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for ring operations
pub type Result<T> = std::result::Result<T, RingError>;

impl From<anyhow::Error> for RingError {
    fn from(err: anyhow::Error) -> Self {
        RingError::Other(format!("{:#}", err))
    }
}
