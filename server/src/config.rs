//! Service configuration
//!
//! Resolved once from command-line arguments and environment at startup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use course_similarity::{
    discover_data_file, CachedEmbedder, Embedder, EmbeddingConfig, HttpEmbedder, SearchConfig,
    SimilarityError, DEFAULT_DATA_CANDIDATES,
};
use course_similarity::embedding::DEFAULT_CACHE_CAPACITY;

use crate::error::ServerResult;

/// Runtime configuration of the server and one-shot commands
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Explicit course CSV; probed from the default locations when unset
    pub data_path: Option<PathBuf>,
    /// Embedding service settings; `None` disables query embeddings
    pub embedding: Option<EmbeddingConfig>,
    /// Most query embeddings kept in memory
    pub embedding_cache_capacity: usize,
    pub search: SearchConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            embedding: None,
            embedding_cache_capacity: DEFAULT_CACHE_CAPACITY,
            search: SearchConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    pub fn with_embedding(mut self, url: impl Into<String>, timeout: Duration) -> Self {
        self.embedding = Some(EmbeddingConfig {
            url: url.into(),
            timeout,
        });
        self
    }

    pub fn with_embedding_cache_capacity(mut self, capacity: usize) -> Self {
        self.embedding_cache_capacity = capacity;
        self
    }

    /// Course CSV to load
    pub fn resolve_data_path(&self) -> ServerResult<PathBuf> {
        match &self.data_path {
            Some(path) if path.is_file() => Ok(path.clone()),
            Some(path) => Err(SimilarityError::data_not_found(path.display().to_string()).into()),
            None => Ok(discover_data_file(DEFAULT_DATA_CANDIDATES)?),
        }
    }

    /// Cached HTTP embedder, if embeddings are enabled
    pub fn embedder(&self) -> Option<Arc<dyn Embedder>> {
        let capacity = self.embedding_cache_capacity;
        self.embedding.clone().map(|config| {
            Arc::new(CachedEmbedder::with_capacity(HttpEmbedder::new(config), capacity))
                as Arc<dyn Embedder>
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;

    #[test]
    fn test_explicit_data_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ServiceConfig::default().with_data_path(file.path());
        assert_eq!(config.resolve_data_path().unwrap(), file.path());
    }

    #[test]
    fn test_missing_explicit_data_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::default().with_data_path(dir.path().join("missing.csv"));
        let err = config.resolve_data_path().unwrap_err();
        assert!(matches!(
            err,
            ServerError::Similarity(SimilarityError::DataNotFound(_))
        ));
    }

    #[test]
    fn test_embedder_toggle() {
        assert!(ServiceConfig::default().embedder().is_none());

        let config = ServiceConfig::default()
            .with_embedding("http://127.0.0.1:9/embed", Duration::from_millis(50));
        assert!(config.embedder().is_some());
        assert_eq!(
            config.embedding.as_ref().map(|e| e.timeout),
            Some(Duration::from_millis(50))
        );
    }

    #[test]
    fn test_embedding_cache_capacity() {
        let config = ServiceConfig::default();
        assert_eq!(config.embedding_cache_capacity, DEFAULT_CACHE_CAPACITY);

        let config = config.with_embedding_cache_capacity(16);
        assert_eq!(config.embedding_cache_capacity, 16);
    }
}
