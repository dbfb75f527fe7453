//! Error types for the course graph server.

use course_similarity::SimilarityError;
use thiserror::Error;

use crate::mcp::protocol::JsonRpcError;

/// Server-defined JSON-RPC code for requests made before the corpus is published
pub const CORPUS_UNAVAILABLE_CODE: i32 = -32002;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServerError {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// True when the corpus has not been published yet
    pub fn is_corpus_unavailable(&self) -> bool {
        matches!(self, Self::Similarity(SimilarityError::CorpusUnavailable))
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

impl From<ServerError> for JsonRpcError {
    fn from(err: ServerError) -> Self {
        let code = match &err {
            e if e.is_corpus_unavailable() => CORPUS_UNAVAILABLE_CODE,
            ServerError::InvalidParams(_)
            | ServerError::UnknownTool(_)
            | ServerError::ResourceNotFound(_) => -32602,
            ServerError::Similarity(SimilarityError::UnknownId(_)) => -32602,
            _ => -32603,
        };

        JsonRpcError {
            code,
            message: err.to_string(),
            data: None,
        }
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
