//! LRU cache for embeddings to avoid repeated provider calls

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use xxhash_rust::xxh3::Xxh3;

use crate::error::Result;

use super::{EmbeddingPair, ImagePayload};

/// LRU cache of embedding pairs, keyed by a hash of the query inputs
pub struct EmbeddingCache {
    cache: Mutex<LruCache<u64, EmbeddingPair>>,
    hits: std::sync::atomic::AtomicU64,
    misses: std::sync::atomic::AtomicU64,
}

impl EmbeddingCache {
    /// Create a new embedding cache
    ///
    /// # Arguments
    /// * `capacity_mb` - Maximum cache size in megabytes
    /// * `dimension` - Embedding dimension (to calculate entry size)
    pub fn new(capacity_mb: usize, dimension: usize) -> Self {
        // Worst case a pair holds two vectors of dimension * 4 bytes (f32)
        let entry_size = 2 * dimension * std::mem::size_of::<f32>();
        let capacity = (capacity_mb * 1024 * 1024) / entry_size.max(1);
        let capacity = NonZeroUsize::new(capacity.max(100)).unwrap();

        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            hits: std::sync::atomic::AtomicU64::new(0),
            misses: std::sync::atomic::AtomicU64::new(0),
        }
    }

    fn key(image: Option<&ImagePayload>, text: Option<&str>) -> u64 {
        let mut hasher = Xxh3::new();
        if let Some(text) = text {
            hasher.update(text.as_bytes());
        }
        // Separator so (text="ab", no image) != (text="a", image=b"b")
        hasher.update(&[0xff]);
        if let Some(image) = image {
            hasher.update(image.as_bytes());
        }
        hasher.digest()
    }

    /// Get a cached pair for the given inputs
    pub fn get(&self, image: Option<&ImagePayload>, text: Option<&str>) -> Option<EmbeddingPair> {
        let key = Self::key(image, text);
        let mut cache = self.cache.lock();

        if let Some(pair) = cache.get(&key) {
            self.hits.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            Some(pair.clone())
        } else {
            self.misses
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            None
        }
    }

    /// Insert a pair for the given inputs
    pub fn insert(&self, image: Option<&ImagePayload>, text: Option<&str>, pair: EmbeddingPair) {
        let key = Self::key(image, text);
        self.cache.lock().put(key, pair);
    }

    /// Get a cached pair, or compute and cache one.
    ///
    /// Provider failures are returned as-is and never cached.
    pub fn get_or_embed<F>(
        &self,
        image: Option<&ImagePayload>,
        text: Option<&str>,
        compute: F,
    ) -> Result<EmbeddingPair>
    where
        F: FnOnce() -> Result<EmbeddingPair>,
    {
        if let Some(pair) = self.get(image, text) {
            return Ok(pair);
        }

        let pair = compute()?;
        self.insert(image, text, pair.clone());
        Ok(pair)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(std::sync::atomic::Ordering::Relaxed);
        let misses = self.misses.load(std::sync::atomic::Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            hits,
            misses,
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
            size: self.cache.lock().len(),
        }
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatefindError;

    fn pair(v: f32) -> EmbeddingPair {
        EmbeddingPair {
            image_vector: None,
            text_vector: Some(vec![v; 4]),
        }
    }

    #[test]
    fn test_cache_operations() {
        let cache = EmbeddingCache::new(1, 4);

        cache.insert(None, Some("hello"), pair(0.1));

        let retrieved = cache.get(None, Some("hello"));
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().text_vector.unwrap(), vec![0.1; 4]);

        assert!(cache.get(None, Some("world")).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_image_and_text_key_separately() {
        let cache = EmbeddingCache::new(1, 4);
        let image = ImagePayload::from_bytes(vec![1, 2, 3]);

        cache.insert(None, Some("soup"), pair(0.1));
        assert!(cache.get(Some(&image), Some("soup")).is_none());
    }

    #[test]
    fn test_get_or_embed() {
        let cache = EmbeddingCache::new(1, 4);

        let mut computed = false;
        let result = cache
            .get_or_embed(None, Some("test"), || {
                computed = true;
                Ok(pair(0.5))
            })
            .unwrap();

        assert!(computed);
        assert_eq!(result.text_vector.unwrap(), vec![0.5; 4]);

        // Second call should use cache
        computed = false;
        let result2 = cache
            .get_or_embed(None, Some("test"), || {
                computed = true;
                Ok(pair(0.0))
            })
            .unwrap();

        assert!(!computed);
        assert_eq!(result2.text_vector.unwrap(), vec![0.5; 4]);
    }

    #[test]
    fn test_failures_not_cached() {
        let cache = EmbeddingCache::new(1, 4);

        let err = cache.get_or_embed(None, Some("bad"), || {
            Err(PlatefindError::EmbeddingUnavailable("down".to_string()))
        });
        assert!(err.is_err());

        // A later successful compute still runs
        let ok = cache.get_or_embed(None, Some("bad"), || Ok(pair(0.9)));
        assert!(ok.is_ok());
    }
}
