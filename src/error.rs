//! Error types for RecordDB
//!
//! Provides a unified error type for all operations.
//!
//! Domain outcomes (id conflicts, invalid documents) are NOT errors; they are
//! reported through [`crate::engine::InsertStatus`]. Everything in here is a
//! failure the caller has to treat as fatal to the request.

use thiserror::Error;

/// Result type alias using RecordError
pub type Result<T> = std::result::Result<T, RecordError>;

/// Unified error type for RecordDB operations
#[derive(Debug, Error)]
pub enum RecordError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Document file corruption detected: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Database is stopped")]
    Stopped,

    // -------------------------------------------------------------------------
    // Worker Pool Errors
    // -------------------------------------------------------------------------
    #[error("Task aborted: {0}")]
    TaskAborted(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for RecordError {
    fn from(err: bincode::Error) -> Self {
        RecordError::Serialization(err.to_string())
    }
}
