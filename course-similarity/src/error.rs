//! Error types for course-similarity

use thiserror::Error;

/// Errors that can occur in the similarity engine
#[derive(Debug, Error)]
pub enum SimilarityError {
    /// CSV ingestion error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding collaborator failed or returned nothing usable
    #[error("Embedding unavailable: {0}")]
    Embedding(String),

    /// Pairwise lookup with an id that is not part of the built corpus
    #[error("Unknown course id: {0}")]
    UnknownId(String),

    /// Search or export requested before the corpus finished building
    #[error("Corpus is not available yet")]
    CorpusUnavailable,

    /// Every ingested row was rejected
    #[error("Corpus is empty: {0}")]
    EmptyCorpus(String),

    /// Pairwise build was cancelled through its control handle
    #[error("Similarity index build cancelled after {completed} of {total} rows")]
    BuildCancelled { completed: usize, total: usize },

    /// No data file found at any candidate location
    #[error("Data file not found: {0}")]
    DataNotFound(String),
}

impl SimilarityError {
    /// Create an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create an unknown id error
    pub fn unknown_id(id: impl Into<String>) -> Self {
        Self::UnknownId(id.into())
    }

    /// Create an empty corpus error
    pub fn empty_corpus(msg: impl Into<String>) -> Self {
        Self::EmptyCorpus(msg.into())
    }

    /// Create a data-not-found error
    pub fn data_not_found(msg: impl Into<String>) -> Self {
        Self::DataNotFound(msg.into())
    }
}

/// Result type for similarity operations
pub type Result<T> = std::result::Result<T, SimilarityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SimilarityError::unknown_id("course-9").to_string(),
            "Unknown course id: course-9"
        );
        assert_eq!(
            SimilarityError::CorpusUnavailable.to_string(),
            "Corpus is not available yet"
        );
        let cancelled = SimilarityError::BuildCancelled {
            completed: 3,
            total: 10,
        };
        assert!(cancelled.to_string().contains("3 of 10"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SimilarityError = io_err.into();
        assert!(matches!(err, SimilarityError::Io(_)));
    }
}
