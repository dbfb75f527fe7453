//! Course Similarity Engine
//!
//! Semantic search and similarity graph data over a catalog of course records
//! that carry precomputed passage embeddings.
//!
//! ## Features
//!
//! - **Validated corpus** - Rows with missing or inconsistent embeddings are counted and skipped
//! - **Pairwise similarity** - All-pairs cosine table built once, in parallel, and read lock-free
//! - **Search with fallback** - Query embeddings when available, TF-IDF keyword scoring otherwise
//! - **Graph export** - Nodes, pair scores and departments for visualization clients
//!
//! ## Example
//!
//! ```ignore
//! use course_similarity::{
//!     BuildControl, CachedEmbedder, Corpus, EmbeddingConfig, HttpEmbedder, SearchQuery,
//! };
//!
//! let corpus = Corpus::from_csv("data/course-embd-data-with-embeddings.csv", &BuildControl::new())?;
//! let embedder = CachedEmbedder::new(HttpEmbedder::new(EmbeddingConfig::default()));
//!
//! let query = SearchQuery::new("machine learning").with_department("Computer Science");
//! let outcome = corpus.search(&query, Some(&embedder));
//! for m in &outcome.matches {
//!     println!("{:.3} {} {}", m.score, m.code, m.name);
//! }
//! ```

pub mod corpus;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod lexical;
pub mod pairwise;
pub mod record;
pub mod search;
pub mod store;
pub mod vector;

// Re-exports for convenience
pub use corpus::Corpus;
pub use embedding::{
    CachedEmbedder, Embedder, EmbeddingConfig, EmbeddingRole, HttpEmbedder, QueryEmbedding,
};
pub use error::{Result, SimilarityError};
pub use graph::{GraphExport, GraphExporter, GraphNode};
pub use ingest::{discover_data_file, read_course_csv, DEFAULT_DATA_CANDIDATES};
pub use lexical::{LexicalScorer, LexicalTable};
pub use pairwise::{BuildControl, PairwiseSimilarityIndex};
pub use record::{CourseId, CourseRecord, EmbeddingField, RawCourseRow};
pub use search::{
    ScoredMatch, ScoringMode, SearchConfig, SearchEngine, SearchOutcome, SearchQuery, DEFAULT_TOP_K,
};
pub use store::{CorpusStore, LoadReport};
pub use vector::cosine_similarity;
