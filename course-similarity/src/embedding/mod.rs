//! Embedding collaborator
//!
//! The engine never loads a model itself. Query vectors come from an external
//! service through the [`Embedder`] trait; stored course vectors are assumed to
//! have been produced with the passage role.

mod cache;
mod http;
mod provider;

pub use cache::{CachedEmbedder, DEFAULT_CACHE_CAPACITY};
pub use http::{EmbeddingConfig, HttpEmbedder, DEFAULT_EMBEDDING_URL};
pub use provider::{request_query_embedding, Embedder, EmbeddingRole, QueryEmbedding};
