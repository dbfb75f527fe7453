//! Embedding cache
//!
//! Wraps any embedder with a bounded LRU cache for repeated queries.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use super::provider::{Embedder, EmbeddingRole};
use crate::error::Result;

/// Entries kept when no capacity is given
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Embedder decorator caching successful results by (role, text)
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Mutex<LruCache<(EmbeddingRole, String), Vec<f32>>>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    /// Cache holding at most `capacity` embeddings (0 falls back to the default)
    pub fn with_capacity(inner: E, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.lock().map(|c| c.cap().get()).unwrap_or(0)
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        if let Ok(mut guard) = self.cache.lock() {
            guard.clear();
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn embed(&self, text: &str, role: EmbeddingRole) -> Result<Vec<f32>> {
        let key = (role, text.to_string());
        if let Some(cached) = self.cache.lock().ok().and_then(|mut c| c.get(&key).cloned()) {
            return Ok(cached);
        }

        // Lock is not held across the request; failures are not cached
        let embedding = self.inner.embed(text, role)?;
        if let Ok(mut guard) = self.cache.lock() {
            guard.put(key, embedding.clone());
        }
        Ok(embedding)
    }
}
