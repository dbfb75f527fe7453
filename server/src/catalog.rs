//! Course catalog lifecycle
//!
//! Builds the corpus on a blocking thread and publishes it in one step.
//! Until then every read fails with `CorpusUnavailable`. A failed build is
//! remembered and reported by [`CatalogManager::status`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use course_similarity::{
    BuildControl, Corpus, Embedder, GraphExport, RawCourseRow, ScoredMatch, SearchConfig,
    SearchQuery, SimilarityError,
};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::{ServerError, ServerResult};

/// Search payload returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<ScoredMatch>,
    /// Seconds spent in the search, embedding request included
    pub query_time: f64,
}

/// Owns the published corpus and the query embedder
pub struct CatalogManager {
    corpus: Arc<RwLock<Option<Arc<Corpus>>>>,
    build_error: RwLock<Option<String>>,
    embedder: Option<Arc<dyn Embedder>>,
    control: Arc<BuildControl>,
    search_config: SearchConfig,
}

impl CatalogManager {
    pub fn new(embedder: Option<Arc<dyn Embedder>>) -> Self {
        Self::with_search_config(embedder, SearchConfig::default())
    }

    pub fn with_search_config(
        embedder: Option<Arc<dyn Embedder>>,
        search_config: SearchConfig,
    ) -> Self {
        Self {
            corpus: Arc::new(RwLock::new(None)),
            build_error: RwLock::new(None),
            embedder,
            control: Arc::new(BuildControl::new()),
            search_config,
        }
    }

    /// Load the course CSV at `path` and publish the built corpus
    pub async fn initialize(&self, path: PathBuf) -> ServerResult<()> {
        tracing::info!("Loading course data from {}", path.display());
        let control = Arc::clone(&self.control);
        let built = tokio::task::spawn_blocking(move || Corpus::from_csv(&path, &control))
            .await
            .map_err(ServerError::from)
            .and_then(|r| r.map_err(ServerError::from));
        self.finish_build(built).await
    }

    /// Build from already ingested rows and publish
    pub async fn initialize_from_rows(&self, rows: Vec<RawCourseRow>) -> ServerResult<()> {
        let control = Arc::clone(&self.control);
        let built = tokio::task::spawn_blocking(move || Corpus::build(rows, &control))
            .await
            .map_err(ServerError::from)
            .and_then(|r| r.map_err(ServerError::from));
        self.finish_build(built).await
    }

    async fn finish_build(&self, built: ServerResult<Corpus>) -> ServerResult<()> {
        match built {
            Ok(corpus) => {
                *self.build_error.write().await = None;
                self.publish(corpus).await;
                Ok(())
            }
            Err(e) => {
                *self.build_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Reason the last build failed, if it did
    pub async fn build_error(&self) -> Option<String> {
        self.build_error.read().await.clone()
    }

    async fn publish(&self, corpus: Corpus) {
        let corpus = corpus.with_search_config(self.search_config.clone());
        tracing::info!(
            "Published corpus: {} courses, {} pairs",
            corpus.store().len(),
            corpus.index().pair_count()
        );
        *self.corpus.write().await = Some(Arc::new(corpus));
    }

    /// Check if a corpus has been published
    pub async fn is_initialized(&self) -> bool {
        self.corpus.read().await.is_some()
    }

    /// Ask an in-flight build to stop; nothing gets published
    pub fn cancel_build(&self) {
        self.control.cancel();
    }

    /// (completed rows, total rows) of the pairwise build
    pub fn build_progress(&self) -> (usize, usize) {
        self.control.progress()
    }

    /// Run a search against the published corpus
    pub async fn search(&self, query: SearchQuery) -> ServerResult<SearchResponse> {
        let corpus = self.get_corpus().await?;
        let embedder = self.embedder.clone();

        // The embedding request is blocking HTTP
        let outcome =
            tokio::task::spawn_blocking(move || corpus.search(&query, embedder.as_deref()))
                .await?;

        Ok(SearchResponse {
            query_time: outcome.elapsed_secs(),
            results: outcome.matches,
        })
    }

    /// Full graph projection of the published corpus
    pub async fn graph(&self) -> ServerResult<GraphExport> {
        let corpus = self.get_corpus().await?;
        let start = Instant::now();
        let export = corpus.export_graph();
        tracing::debug!(
            "Exported graph with {} nodes and {} similarities in {:?}",
            export.nodes.len(),
            export.similarities.len(),
            start.elapsed()
        );
        Ok(export)
    }

    pub async fn departments(&self) -> ServerResult<Vec<String>> {
        Ok(self.get_corpus().await?.store().departments())
    }

    /// Load state, sizes and rejection counts
    pub async fn status(&self) -> serde_json::Value {
        let (completed, total) = self.build_progress();
        let progress = serde_json::json!({ "completedRows": completed, "totalRows": total });

        match self.corpus.read().await.as_ref() {
            Some(corpus) => serde_json::json!({
                "loaded": true,
                "state": "ready",
                "courses": corpus.store().len(),
                "dimension": corpus.store().dimension(),
                "departments": corpus.store().departments().len(),
                "pairs": corpus.index().pair_count(),
                "loadReport": corpus.load_report(),
                "embeddingEnabled": self.embedder.is_some(),
                "buildProgress": progress,
            }),
            None => match self.build_error().await {
                Some(error) => serde_json::json!({
                    "loaded": false,
                    "state": "failed",
                    "error": error,
                    "embeddingEnabled": self.embedder.is_some(),
                    "buildProgress": progress,
                }),
                None => serde_json::json!({
                    "loaded": false,
                    "state": "building",
                    "embeddingEnabled": self.embedder.is_some(),
                    "buildProgress": progress,
                }),
            },
        }
    }

    /// Get the published corpus, returning error if not initialized
    async fn get_corpus(&self) -> ServerResult<Arc<Corpus>> {
        self.corpus
            .read()
            .await
            .clone()
            .ok_or_else(|| SimilarityError::CorpusUnavailable.into())
    }
}
