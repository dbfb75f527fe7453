//! Embedder trait and query embedding outcome

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which side of the asymmetric embedding scheme a text belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingRole {
    /// Search input
    Query,
    /// Course text stored in the corpus
    Passage,
}

impl EmbeddingRole {
    pub fn is_query(self) -> bool {
        matches!(self, Self::Query)
    }
}

/// Produces dense vectors for text
pub trait Embedder: Send + Sync {
    /// Embed `text` with the instruction for `role`
    fn embed(&self, text: &str, role: EmbeddingRole) -> Result<Vec<f32>>;
}

impl<E: Embedder + ?Sized> Embedder for std::sync::Arc<E> {
    fn embed(&self, text: &str, role: EmbeddingRole) -> Result<Vec<f32>> {
        (**self).embed(text, role)
    }
}

/// Query representation consumed by the search engine
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEmbedding {
    Vector(Vec<f32>),
    /// No usable vector; the reason is kept for logging
    Unavailable(String),
}

/// Ask `embedder` for a query-role vector of `expected_dimension` components.
///
/// Blank queries, collaborator errors, empty vectors and vectors of the wrong
/// dimensionality all come back as `Unavailable`.
pub fn request_query_embedding(
    embedder: Option<&dyn Embedder>,
    text: &str,
    expected_dimension: usize,
) -> QueryEmbedding {
    let Some(embedder) = embedder else {
        return QueryEmbedding::Unavailable("no embedder configured".to_string());
    };
    if text.trim().is_empty() {
        return QueryEmbedding::Unavailable("query is empty".to_string());
    }

    match embedder.embed(text, EmbeddingRole::Query) {
        Ok(vector) if vector.is_empty() => {
            QueryEmbedding::Unavailable("embedder returned an empty vector".to_string())
        }
        Ok(vector) if expected_dimension != 0 && vector.len() != expected_dimension => {
            QueryEmbedding::Unavailable(format!(
                "query vector has {} dimensions, corpus has {}",
                vector.len(),
                expected_dimension
            ))
        }
        Ok(vector) => QueryEmbedding::Vector(vector),
        Err(e) => QueryEmbedding::Unavailable(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimilarityError;
    use std::sync::Mutex;

    struct Fixed(Vec<f32>);

    impl Embedder for Fixed {
        fn embed(&self, _text: &str, _role: EmbeddingRole) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl Embedder for Failing {
        fn embed(&self, _text: &str, _role: EmbeddingRole) -> Result<Vec<f32>> {
            Err(SimilarityError::embedding("connection refused"))
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<EmbeddingRole>>);

    impl Embedder for Recording {
        fn embed(&self, _text: &str, role: EmbeddingRole) -> Result<Vec<f32>> {
            self.0.lock().unwrap().push(role);
            Ok(vec![1.0, 0.0])
        }
    }

    #[test]
    fn test_vector_returned() {
        let embedder = Fixed(vec![1.0, 0.0]);
        assert_eq!(
            request_query_embedding(Some(&embedder), "graphs", 2),
            QueryEmbedding::Vector(vec![1.0, 0.0])
        );
    }

    #[test]
    fn test_always_requests_query_role() {
        let embedder = Recording::default();
        request_query_embedding(Some(&embedder), "graphs", 2);
        assert_eq!(*embedder.0.lock().unwrap(), vec![EmbeddingRole::Query]);
    }

    #[test]
    fn test_unavailable_cases() {
        assert!(matches!(
            request_query_embedding(None, "graphs", 2),
            QueryEmbedding::Unavailable(_)
        ));
        assert!(matches!(
            request_query_embedding(Some(&Failing), "graphs", 2),
            QueryEmbedding::Unavailable(ref r) if r.contains("connection refused")
        ));
        assert!(matches!(
            request_query_embedding(Some(&Fixed(vec![])), "graphs", 2),
            QueryEmbedding::Unavailable(_)
        ));
        assert!(matches!(
            request_query_embedding(Some(&Fixed(vec![1.0, 0.0, 0.0])), "graphs", 2),
            QueryEmbedding::Unavailable(_)
        ));
    }

    #[test]
    fn test_blank_query_skips_embedder() {
        let embedder = Recording::default();
        let result = request_query_embedding(Some(&embedder), "  \t ", 2);
        assert!(matches!(result, QueryEmbedding::Unavailable(_)));
        assert!(embedder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_role_flags() {
        assert!(EmbeddingRole::Query.is_query());
        assert!(!EmbeddingRole::Passage.is_query());
    }
}
