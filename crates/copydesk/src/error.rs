//! Error types for copydesk

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for copydesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Copydesk errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid request input
    #[error("Invalid request: {0}")]
    Validation(String),

    /// No artifact or record matched the lookup
    #[error("Not found: {0}")]
    NotFound(String),

    /// Embedding backend failure
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Completion backend failure
    #[error("LLM error: {0}")]
    Llm(String),

    /// The vector store has never been written
    #[error("No embeddings index found")]
    NoIndex,

    /// Index or metadata file is unreadable, corrupt or out of step
    #[error("Embeddings index unavailable: {0}")]
    IndexUnavailable(String),

    /// Vector length differs from the dimension fixed by the first insert
    #[error("Embedding dimension mismatch: store holds {expected}-d vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Persisting the index or metadata failed
    #[error("Failed to write embeddings index: {0}")]
    StoreWrite(String),

    /// Document export service failure
    #[error("Document export failed: {0}")]
    Export(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an index-unavailable error
    pub fn index_unavailable(message: impl Into<String>) -> Self {
        Self::IndexUnavailable(message.into())
    }

    /// Create a store write error
    pub fn store_write(message: impl Into<String>) -> Self {
        Self::StoreWrite(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this is a backend (embedding or completion) failure.
    ///
    /// Backend failures are recoverable per call: a failed retrieval leg is
    /// skipped rather than failing the whole request.
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Embedding(_) | Error::Llm(_) | Error::Http(_))
    }

    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::Embedding(_) => (StatusCode::BAD_GATEWAY, "embedding_error"),
            Error::Llm(_) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error"),
            Error::NoIndex => (StatusCode::NOT_FOUND, "no_index"),
            Error::IndexUnavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "index_unavailable"),
            Error::DimensionMismatch { .. } => (StatusCode::BAD_REQUEST, "dimension_mismatch"),
            Error::StoreWrite(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_write_error"),
            Error::Export(_) => (StatusCode::BAD_GATEWAY, "export_error"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.kind();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::NoIndex.kind().0, StatusCode::NOT_FOUND);
        assert_eq!(Error::not_found("topic 'x'").kind().0, StatusCode::NOT_FOUND);
        assert_eq!(
            Error::DimensionMismatch { expected: 3, actual: 4 }.kind().0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::store_write("disk full").kind().1, "store_write_error");
    }

    #[test]
    fn test_backend_classification() {
        assert!(Error::embedding("quota").is_backend());
        assert!(Error::llm("timeout").is_backend());
        assert!(!Error::NoIndex.is_backend());
        assert!(!Error::index_unavailable("bad header").is_backend());
    }
}
