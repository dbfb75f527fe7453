//! HTTP client for the embedding service
//!
//! Wire format: `POST {"texts": [...], "is_query": bool}` answered with
//! `{"embeddings": [[...]], "time_taken": seconds}`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::provider::{Embedder, EmbeddingRole};
use crate::error::{Result, SimilarityError};

/// Default embedding service endpoint
pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:8000/embed";

/// Embedding client configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Endpoint accepting embed requests
    pub url: String,
    /// Upper bound for one request, connect included (default: 10s)
    pub timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_EMBEDDING_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: Vec<&'a str>,
    is_query: bool,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    time_taken: Option<f64>,
}

/// Blocking embedder backed by the embedding HTTP service
pub struct HttpEmbedder {
    agent: ureq::Agent,
    config: EmbeddingConfig,
}

impl HttpEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        log::info!(
            "Embedding service at {} (timeout {:?})",
            config.url,
            config.timeout
        );
        Self { agent, config }
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str, role: EmbeddingRole) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            texts: vec![text],
            is_query: role.is_query(),
        };

        let response: EmbedResponse = self
            .agent
            .post(&self.config.url)
            .send_json(&request)
            .map_err(|e| SimilarityError::embedding(format!("request failed: {}", e)))?
            .into_json()
            .map_err(|e| SimilarityError::embedding(format!("invalid response: {}", e)))?;

        if let Some(seconds) = response.time_taken {
            log::debug!("Embedding service took {:.3}s", seconds);
        }

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| SimilarityError::embedding("no embedding returned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.url, "http://localhost:8000/embed");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_request_serialization() {
        let request = EmbedRequest {
            texts: vec!["intro to databases"],
            is_query: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"texts": ["intro to databases"], "is_query": true})
        );
    }

    #[test]
    fn test_response_parsing() {
        let response: EmbedResponse =
            serde_json::from_str(r#"{"embeddings": [[0.5, -0.5]], "time_taken": 0.12}"#).unwrap();
        assert_eq!(response.embeddings, vec![vec![0.5, -0.5]]);

        let bare: EmbedResponse = serde_json::from_str(r#"{"embeddings": []}"#).unwrap();
        assert!(bare.embeddings.is_empty());
        assert!(bare.time_taken.is_none());
    }

    #[test]
    fn test_unreachable_service_is_error() {
        let embedder = HttpEmbedder::new(EmbeddingConfig {
            url: "http://127.0.0.1:9/embed".to_string(),
            timeout: Duration::from_millis(500),
        });
        let err = embedder.embed("query", EmbeddingRole::Query).unwrap_err();
        assert!(matches!(err, SimilarityError::Embedding(_)));
    }
}
