mod cache;
mod provider;
mod remote;

pub use cache::{CacheStats, EmbeddingCache};
pub use provider::{EmbeddingPair, EmbeddingProvider, ImagePayload};
pub use remote::RemoteEmbedder;

use std::sync::Arc;

use crate::error::Result;

/// Embedding provider that consults an LRU cache before the inner provider
pub struct CachedEmbedder<P> {
    inner: P,
    cache: Arc<EmbeddingCache>,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    pub fn new(inner: P, cache: Arc<EmbeddingCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    fn embed(&self, image: Option<&ImagePayload>, text: Option<&str>) -> Result<EmbeddingPair> {
        self.cache
            .get_or_embed(image, text, || self.inner.embed(image, text))
    }
}
