//! Common error types for Acordes

use thiserror::Error;

/// Common result type for Acordes operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Acordes crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Durable store refused a write because it would exceed capacity
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, capacity {capacity}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        capacity: usize,
    },

    /// Search or chord-generation service failure
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
