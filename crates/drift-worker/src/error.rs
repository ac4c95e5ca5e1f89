//! Worker error types.

use thiserror::Error;

/// Errors from a context store backend.
///
/// A missing message or stream is not an error; stores return `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure (connection, lock, query)
    #[error("Store backend error: {0}")]
    Backend(String),

    /// Fixture or row could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Fixture file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors when handing an event to the worker queue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    /// Queue at capacity; the event was dropped
    #[error("Event queue is full")]
    Full,

    /// All workers have stopped
    #[error("Event queue is closed")]
    Closed,
}
