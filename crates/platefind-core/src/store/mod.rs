//! Document store with per-modality ANN indexes

mod vector;

pub use vector::VectorIndex;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::document::Document;
use crate::error::{PlatefindError, Result};

/// One row returned by a modality search: the document id, its similarity
/// score for that modality, and the opaque display payload.
#[derive(Debug, Clone)]
pub struct SearchRow {
    pub id: String,
    pub score: f32,
    pub payload: serde_json::Value,
}

/// Approximate nearest-neighbor search over a named index.
///
/// The hybrid engine only sees this trait; any store exposing single-vector
/// ANN search can back it.
pub trait VectorSearchProvider {
    /// Search `index` for the nearest stored vectors.
    ///
    /// Fails with `SearchUnavailable` (or `UnknownIndex`) on index or
    /// connectivity error; scores are similarities in [0, 1].
    fn search(
        &self,
        index: &str,
        query_vector: &[f32],
        num_candidates: usize,
        limit: usize,
    ) -> Result<Vec<SearchRow>>;
}

/// Persistent data for the store
#[derive(Debug, Serialize, Deserialize)]
struct StoreData {
    dimension: usize,
    saved_at: chrono::DateTime<chrono::Utc>,
    documents: Vec<Document>,
}

/// Document store backed by one HNSW index per modality plus an id ->
/// payload table. Persists as JSON under the data directory and rebuilds
/// the ANN indexes on load.
pub struct VectorStore {
    path: PathBuf,
    dimension: usize,
    image_index_name: String,
    text_index_name: String,
    image_index: VectorIndex,
    text_index: VectorIndex,
    documents: RwLock<HashMap<String, Document>>,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("path", &self.path)
            .field("dimension", &self.dimension)
            .field("image_index_name", &self.image_index_name)
            .field("text_index_name", &self.text_index_name)
            .finish_non_exhaustive()
    }
}

impl VectorStore {
    /// Create a new empty store
    pub fn new(path: PathBuf, dimension: usize, config: &StoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&path)?;

        Ok(Self {
            path,
            dimension,
            image_index_name: config.image_index.clone(),
            text_index_name: config.text_index.clone(),
            image_index: VectorIndex::new(dimension),
            text_index: VectorIndex::new(dimension),
            documents: RwLock::new(HashMap::new()),
        })
    }

    /// Load an existing store from disk
    pub fn load(path: PathBuf, config: &StoreConfig) -> Result<Self> {
        let data_path = path.join("store.json");

        if !data_path.exists() {
            return Err(PlatefindError::StoreNotFound(path));
        }

        let data: StoreData = serde_json::from_reader(std::fs::File::open(&data_path)?)
            .map_err(|e| PlatefindError::Config(format!("Failed to load store data: {e}")))?;

        let store = Self::new(path, data.dimension, config)?;
        for doc in data.documents {
            store.insert(doc)?;
        }

        Ok(store)
    }

    /// Check if a store exists at the path
    pub fn exists(path: &Path) -> bool {
        path.join("store.json").exists()
    }

    /// Insert a document, indexing whichever embeddings it carries.
    ///
    /// Re-inserting an existing id replaces its payload; its old vectors
    /// remain in the ANN indexes but resolve to the same document.
    pub fn insert(&self, doc: Document) -> Result<()> {
        if let Some(ref v) = doc.image_embedding {
            self.image_index.insert(&doc.id, v)?;
        }
        if let Some(ref v) = doc.text_embedding {
            self.text_index.insert(&doc.id, v)?;
        }

        self.documents.write().insert(doc.id.clone(), doc);
        Ok(())
    }

    /// Save the store to disk
    pub fn save(&self) -> Result<()> {
        let data_path = self.path.join("store.json");

        let documents = self.documents.read();
        let data = StoreData {
            dimension: self.dimension,
            saved_at: chrono::Utc::now(),
            documents: documents.values().cloned().collect(),
        };

        serde_json::to_writer(std::fs::File::create(&data_path)?, &data)
            .map_err(|e| PlatefindError::Config(format!("Failed to save store data: {e}")))?;

        Ok(())
    }

    /// Number of documents in the store
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Check if the store has no documents
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Per-index vector counts (image, text)
    pub fn vector_counts(&self) -> (usize, usize) {
        (self.image_index.len(), self.text_index.len())
    }

    /// Look up a document by id
    pub fn get(&self, id: &str) -> Option<Document> {
        self.documents.read().get(id).cloned()
    }

    fn index_by_name(&self, name: &str) -> Result<&VectorIndex> {
        if name == self.image_index_name {
            Ok(&self.image_index)
        } else if name == self.text_index_name {
            Ok(&self.text_index)
        } else {
            Err(PlatefindError::UnknownIndex(name.to_string()))
        }
    }
}

impl VectorSearchProvider for VectorStore {
    fn search(
        &self,
        index: &str,
        query_vector: &[f32],
        num_candidates: usize,
        limit: usize,
    ) -> Result<Vec<SearchRow>> {
        let neighbors = self
            .index_by_name(index)?
            .search(query_vector, num_candidates, limit)?;

        let documents = self.documents.read();
        let mut rows = Vec::with_capacity(neighbors.len());

        for (doc_id, score) in neighbors {
            // A vector without a document is a malformed record: skip it
            // rather than aborting the whole search.
            match documents.get(&doc_id) {
                Some(doc) => rows.push(SearchRow {
                    id: doc_id,
                    score,
                    payload: serde_json::Value::Object(doc.payload.clone()),
                }),
                None => {
                    tracing::warn!("Vector for unknown document {doc_id} in index {index}");
                }
            }
        }

        Ok(rows)
    }
}
