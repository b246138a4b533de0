//! HNSW index for one embedding modality

use hnsw_rs::prelude::*;
use parking_lot::RwLock;

use crate::error::{PlatefindError, Result};

/// Stored vector with its document ID
#[derive(Debug, Clone)]
struct StoredVector {
    doc_id: String,
    vector: Vec<f32>,
}

/// In-memory HNSW index over a single embedding field.
///
/// Persistence is owned by [`super::VectorStore`], which rebuilds each
/// index from the stored documents on load.
pub struct VectorIndex {
    hnsw: RwLock<Hnsw<'static, f32, DistCosine>>,
    dimension: usize,
    vectors: RwLock<Vec<StoredVector>>,
}

fn new_hnsw(capacity: usize) -> Hnsw<'static, f32, DistCosine> {
    // HNSW parameters:
    // - max_nb_connection (M): 16 is a good default
    // - max_elements: Initial capacity, will grow
    // - max_layer: log2(max_elements) is optimal
    // - ef_construction: Higher = better quality, slower build
    Hnsw::new(16, capacity.max(10_000), 16, 200, DistCosine {})
}

impl VectorIndex {
    /// Create a new empty index
    pub fn new(dimension: usize) -> Self {
        Self {
            hnsw: RwLock::new(new_hnsw(10_000)),
            dimension,
            vectors: RwLock::new(Vec::new()),
        }
    }

    /// Insert an embedding and return its internal ID
    pub fn insert(&self, doc_id: &str, embedding: &[f32]) -> Result<u64> {
        if embedding.len() != self.dimension {
            return Err(PlatefindError::DimensionMismatch {
                expected: self.dimension,
                got: embedding.len(),
            });
        }

        let mut vectors = self.vectors.write();
        let id = vectors.len();

        vectors.push(StoredVector {
            doc_id: doc_id.to_string(),
            vector: embedding.to_vec(),
        });

        let hnsw = self.hnsw.write();
        hnsw.insert((&embedding.to_vec(), id));

        Ok(id as u64)
    }

    /// Search for similar vectors.
    ///
    /// Returns (doc_id, score) pairs sorted by score descending, with the
    /// cosine distance mapped to a similarity in [0, 1].
    pub fn search(
        &self,
        query: &[f32],
        num_candidates: usize,
        limit: usize,
    ) -> Result<Vec<(String, f32)>> {
        if query.len() != self.dimension {
            return Err(PlatefindError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }

        let hnsw = self.hnsw.read();
        let vectors = self.vectors.read();

        if vectors.is_empty() {
            return Ok(vec![]);
        }

        // ef_search must be >= limit; the candidate pool drives recall
        let ef_search = num_candidates.max(limit);
        let neighbors = hnsw.search(query, limit, ef_search);

        Ok(neighbors
            .into_iter()
            .filter_map(|n| {
                vectors
                    .get(n.d_id)
                    .map(|sv| (sv.doc_id.clone(), distance_to_score(n.distance)))
            })
            .collect())
    }

    /// Get the number of vectors in the index
    pub fn len(&self) -> usize {
        self.vectors.read().len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Clear the index
    pub fn clear(&self) {
        let mut hnsw = self.hnsw.write();
        *hnsw = new_hnsw(10_000);
        self.vectors.write().clear();
    }
}

/// Map a cosine distance in [0, 2] to a similarity score in [0, 1]
fn distance_to_score(distance: f32) -> f32 {
    (1.0 - distance / 2.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_index_basic() -> Result<()> {
        let index = VectorIndex::new(4);

        let v1 = vec![1.0, 0.0, 0.0, 0.0];
        let v2 = vec![0.0, 1.0, 0.0, 0.0];
        let v3 = vec![0.9, 0.1, 0.0, 0.0]; // Similar to v1

        index.insert("doc1", &v1)?;
        index.insert("doc2", &v2)?;
        index.insert("doc3", &v3)?;

        assert_eq!(index.len(), 3);

        let results = index.search(&v1, 100, 2)?;
        assert_eq!(results.len(), 2);

        let doc_ids: Vec<_> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert!(doc_ids.contains(&"doc1"));

        // Exact match scores (near) 1.0, everything stays in [0, 1]
        for (id, score) in &results {
            assert!((0.0..=1.0).contains(score), "{id} score out of range");
        }
        let (top_id, top_score) = &results[0];
        assert_eq!(top_id, "doc1");
        assert!(*top_score > 0.99);

        Ok(())
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = VectorIndex::new(4);
        assert!(matches!(
            index.insert("doc1", &[1.0, 0.0]),
            Err(PlatefindError::DimensionMismatch { expected: 4, got: 2 })
        ));
        assert!(index.search(&[1.0, 0.0], 100, 5).is_err());
    }

    #[test]
    fn test_empty_index_returns_nothing() -> Result<()> {
        let index = VectorIndex::new(4);
        assert!(index.search(&[1.0, 0.0, 0.0, 0.0], 100, 5)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_distance_to_score_bounds() {
        assert_eq!(distance_to_score(0.0), 1.0);
        assert_eq!(distance_to_score(2.0), 0.0);
        assert_eq!(distance_to_score(1.0), 0.5);
    }
}
