//! Error types for the topic drift system.

use thiserror::Error;

/// Unified error type for shared drift operations.
#[derive(Debug, Error)]
pub enum DriftError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
