//! platefind-core - Core library for platefind hybrid recipe search
//!
//! This crate provides the core functionality for importing and searching
//! a recipe/product catalog by image and text:
//! - HNSW-based ANN indexes, one per embedding modality
//! - Remote multimodal embedding provider with an LRU cache
//! - Hybrid search merging both modalities into one weighted ranking
//! - Configuration management

pub mod config;
pub mod document;
pub mod embeddings;
pub mod error;
pub mod search;
pub mod store;

pub use config::Config;
pub use document::Document;
pub use error::{PlatefindError, Result};
pub use search::{HybridSearchEngine, RankedResult, SearchQuery, SearchResult};

use std::sync::Arc;

use embeddings::{CacheStats, CachedEmbedder, EmbeddingCache, RemoteEmbedder};
use store::VectorStore;

/// High-level catalog for importing documents and running hybrid searches.
///
/// Owns the long-lived collaborators (vector store, embedding client,
/// cache); the search engine itself is stateless and constructed per call
/// with these injected.
pub struct Catalog {
    /// Configuration
    config: Config,
    /// Document store with per-modality ANN indexes
    store: VectorStore,
    /// Remote embedding provider behind an LRU cache
    embedder: CachedEmbedder<RemoteEmbedder>,
}

impl Catalog {
    /// Open or create a catalog using config from the default locations
    pub fn open() -> Result<Self> {
        Self::open_with_config(Config::load())
    }

    /// Open or create a catalog with custom config
    pub fn open_with_config(config: Config) -> Result<Self> {
        let data_dir = config.store.data_dir.clone();
        std::fs::create_dir_all(&data_dir)?;

        let store = if VectorStore::exists(&data_dir) {
            VectorStore::load(data_dir, &config.store)?
        } else {
            VectorStore::new(data_dir, config.embedding.dimension, &config.store)?
        };

        let remote = RemoteEmbedder::new(&config.embedding)?;
        let cache = Arc::new(EmbeddingCache::new(
            config.embedding.cache_mb,
            config.embedding.dimension,
        ));
        let embedder = CachedEmbedder::new(remote, cache);

        Ok(Self {
            config,
            store,
            embedder,
        })
    }

    /// Import documents into the store and persist it.
    ///
    /// Documents with embeddings of the wrong dimension are skipped with a
    /// warning rather than aborting the batch.
    pub fn import(&self, docs: Vec<Document>) -> Result<ImportStats> {
        let mut stats = ImportStats::default();

        for doc in docs {
            let has_image = doc.image_embedding.is_some();
            let has_text = doc.text_embedding.is_some();
            let id = doc.id.clone();

            match self.store.insert(doc) {
                Ok(()) => {
                    stats.imported += 1;
                    stats.image_vectors += usize::from(has_image);
                    stats.text_vectors += usize::from(has_text);
                }
                Err(e) => {
                    tracing::warn!("Skipping document {id}: {e}");
                    stats.skipped += 1;
                }
            }
        }

        self.store.save()?;
        Ok(stats)
    }

    /// Run a hybrid search against the catalog
    pub fn search(&self, query: &SearchQuery, k: Option<usize>) -> Result<SearchResult> {
        let engine = HybridSearchEngine::new(
            self.config.search.clone(),
            &self.config.store,
            &self.embedder,
            &self.store,
        );
        engine.search(query, k)
    }

    /// Number of documents in the catalog
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the catalog has no documents
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Embedding dimension of the catalog's indexes
    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }

    /// Per-index vector counts (image, text)
    pub fn vector_counts(&self) -> (usize, usize) {
        self.store.vector_counts()
    }

    /// Embedding cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.embedder.cache_stats()
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Statistics from an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportStats {
    pub imported: usize,
    pub image_vectors: usize,
    pub text_vectors: usize,
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::tempdir;

    fn test_config(data_dir: std::path::PathBuf, endpoint: String) -> Config {
        let mut config = Config::default();
        config.store.data_dir = data_dir;
        config.embedding.dimension = 4;
        config.embedding.endpoint = endpoint;
        config.embedding.timeout_secs = 2;
        config
    }

    fn doc(id: &str, text_embedding: Vec<f32>) -> Document {
        Document::new(id)
            .with_text_embedding(text_embedding)
            .with_field("name", serde_json::json!(id))
    }

    #[test]
    fn test_catalog_import_and_search() -> Result<()> {
        let temp_dir = tempdir().unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/embed");
            then.status(200)
                .json_body(serde_json::json!({ "text_embedding": [1.0, 0.0, 0.0, 0.0] }));
        });

        let catalog = Catalog::open_with_config(test_config(
            temp_dir.path().join("data"),
            server.url("/embed"),
        ))?;

        let stats = catalog.import(vec![
            doc("tonkotsu ramen", vec![0.9, 0.1, 0.0, 0.0]),
            doc("fruit salad", vec![0.0, 0.0, 1.0, 0.0]),
        ])?;
        assert_eq!(stats.imported, 2);
        assert_eq!(stats.text_vectors, 2);

        let result = catalog.search(&SearchQuery::text("ramen"), Some(1))?;
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].id, "tonkotsu ramen");
        assert_eq!(result.results[0].payload["name"], "tonkotsu ramen");

        Ok(())
    }

    #[test]
    fn test_catalog_reopens_persisted_store() -> Result<()> {
        let temp_dir = tempdir().unwrap();
        let server = MockServer::start();
        let config = test_config(temp_dir.path().join("data"), server.url("/embed"));

        {
            let catalog = Catalog::open_with_config(config.clone())?;
            catalog.import(vec![doc("pho", vec![1.0, 0.0, 0.0, 0.0])])?;
        }

        let catalog = Catalog::open_with_config(config)?;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.dimension(), 4);

        Ok(())
    }

    #[test]
    fn test_import_skips_mismatched_dimensions() -> Result<()> {
        let temp_dir = tempdir().unwrap();
        let server = MockServer::start();
        let catalog = Catalog::open_with_config(test_config(
            temp_dir.path().join("data"),
            server.url("/embed"),
        ))?;

        let stats = catalog.import(vec![
            doc("good", vec![1.0, 0.0, 0.0, 0.0]),
            doc("bad", vec![1.0, 0.0]),
        ])?;

        assert_eq!(stats.imported, 1);
        assert_eq!(stats.skipped, 1);
        Ok(())
    }
}
