//! Error types for the Sagitta library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`SagittaError`] enum. Retrieval-branch failures during a hybrid search
//! are deliberately *not* surfaced through this type at the public search
//! boundary; they degrade the result instead (see the `hybrid` module).

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Sagitta operations.
#[derive(Error, Debug)]
pub enum SagittaError {
    /// I/O errors (file operations, persistence, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-related errors (validation, invalid parameters, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector backend errors
    #[error("Vector backend error: {0}")]
    VectorBackend(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with SagittaError.
pub type Result<T> = std::result::Result<T, SagittaError>;

impl SagittaError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        SagittaError::Index(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        SagittaError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        SagittaError::Query(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        SagittaError::Storage(msg.into())
    }

    /// Create a new embedding error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        SagittaError::Embedding(msg.into())
    }

    /// Create a new vector backend error.
    pub fn vector_backend<S: Into<String>>(msg: S) -> Self {
        SagittaError::VectorBackend(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        SagittaError::InvalidOperation(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        SagittaError::SerializationError(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SagittaError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SagittaError::query("empty query text");
        assert_eq!(err.to_string(), "Query error: empty query text");

        let err = SagittaError::index("not built");
        assert_eq!(err.to_string(), "Index error: not built");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: SagittaError = io_err.into();
        assert!(matches!(err, SagittaError::Io(_)));
    }
}
