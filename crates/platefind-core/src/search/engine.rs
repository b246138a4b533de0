//! Hybrid multimodal search: two independent ANN searches merged into one
//! weighted ranking.
//!
//! Each modality (image, text) is queried separately with an over-fetch
//! factor, then merged by document id in application logic. This keeps the
//! engine portable across stores that only support single-vector
//! nearest-neighbor search, and lets a document strong in one modality
//! survive the merge even when the other modality never saw it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Instant;

use crate::config::{SearchConfig, StoreConfig};
use crate::embeddings::EmbeddingProvider;
use crate::error::{PlatefindError, Result};
use crate::store::{SearchRow, VectorSearchProvider};

use super::query::SearchQuery;
use super::results::{RankedResult, SearchResult};

/// Stateless hybrid search over injected collaborators.
///
/// The embedding provider and vector store are long-lived resources owned
/// by the application; the engine borrows them per call and keeps no state
/// of its own.
pub struct HybridSearchEngine<'a> {
    config: SearchConfig,
    image_index: String,
    text_index: String,
    embedder: &'a dyn EmbeddingProvider,
    store: &'a dyn VectorSearchProvider,
}

impl<'a> HybridSearchEngine<'a> {
    pub fn new(
        config: SearchConfig,
        store_config: &StoreConfig,
        embedder: &'a dyn EmbeddingProvider,
        store: &'a dyn VectorSearchProvider,
    ) -> Self {
        Self {
            config,
            image_index: store_config.image_index.clone(),
            text_index: store_config.text_index.clone(),
            embedder,
            store,
        }
    }

    /// Run a hybrid search and return the top `k` valid results.
    ///
    /// Fails with `InvalidInput` if the query has no content or a
    /// non-positive weight sum, and with `EmbeddingUnavailable` if the
    /// provider produced no vector for either modality. A single failed
    /// modality search degrades to single-modality ranking; the call only
    /// fails when every dispatched search failed.
    pub fn search(&self, query: &SearchQuery, k: Option<usize>) -> Result<SearchResult> {
        let start = Instant::now();
        let k = k.unwrap_or(self.config.default_k).min(self.config.max_k);

        let (image_weight, text_weight) = query.normalized_weights()?;

        let embeddings = self
            .embedder
            .embed(query.image.as_ref(), query.text.as_deref())?;
        if embeddings.is_empty() {
            return Err(PlatefindError::EmbeddingUnavailable(
                "embedding provider returned no vectors".to_string(),
            ));
        }

        // Over-fetch so a document strong in one modality is not pruned
        // before the merge.
        let fetch_limit = k.saturating_mul(self.config.overfetch_factor).max(k);

        let mut dispatched = 0usize;
        let mut failed = 0usize;
        let mut absorb = |modality: &str, outcome: Option<Result<Vec<SearchRow>>>| match outcome {
            Some(Ok(rows)) => {
                dispatched += 1;
                rows
            }
            Some(Err(e)) => {
                dispatched += 1;
                failed += 1;
                tracing::warn!("{modality} vector search failed: {e}");
                vec![]
            }
            None => vec![],
        };

        let image_rows = absorb(
            "image",
            embeddings
                .image_vector
                .as_ref()
                .map(|v| self.modality_search(&self.image_index, v, fetch_limit)),
        );
        let text_rows = absorb(
            "text",
            embeddings
                .text_vector
                .as_ref()
                .map(|v| self.modality_search(&self.text_index, v, fetch_limit)),
        );

        if dispatched > 0 && failed == dispatched {
            return Err(PlatefindError::SearchUnavailable(
                "all modality searches failed".to_string(),
            ));
        }

        // A modality with no vector carries no weight for filtering
        let image_filter_weight = if embeddings.image_vector.is_some() {
            image_weight
        } else {
            0.0
        };
        let text_filter_weight = if embeddings.text_vector.is_some() {
            text_weight
        } else {
            0.0
        };

        let mut merged = merge_by_id(image_rows, text_rows);

        for candidate in &mut merged {
            candidate.combined_score = image_weight * candidate.img_score.unwrap_or(0.0)
                + text_weight * candidate.text_score.unwrap_or(0.0);
        }

        merged.retain(|c| self.passes_filter(c, image_filter_weight, text_filter_weight));

        // Stable sort: ties keep retrieval order
        merged.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(k);

        Ok(SearchResult {
            total: merged.len(),
            results: merged,
            query_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn modality_search(
        &self,
        index: &str,
        vector: &[f32],
        fetch_limit: usize,
    ) -> Result<Vec<SearchRow>> {
        self.store
            .search(index, vector, self.config.num_candidates, fetch_limit)
    }

    /// Quality thresholds from the original ranking heuristics; both are
    /// configurable, not derived.
    fn passes_filter(
        &self,
        candidate: &RankedResult,
        image_weight: f32,
        text_weight: f32,
    ) -> bool {
        if candidate.combined_score < self.config.min_combined_score {
            return false;
        }

        if image_weight > 0.0 {
            if let Some(score) = candidate.img_score {
                if score < self.config.min_component_score {
                    return false;
                }
            }
        }

        if text_weight > 0.0 {
            if let Some(score) = candidate.text_score {
                if score < self.config.min_component_score {
                    return false;
                }
            }
        }

        true
    }
}

/// Merge the two modality result sets by document id, preserving the order
/// in which ids were first retrieved.
///
/// Each search contributes only its own score field, so there is no
/// overwrite conflict; the payload comes from whichever search produced the
/// record first (both searches project the same display fields).
fn merge_by_id(image_rows: Vec<SearchRow>, text_rows: Vec<SearchRow>) -> Vec<RankedResult> {
    let mut merged: Vec<RankedResult> = Vec::with_capacity(image_rows.len() + text_rows.len());
    let mut index_of: HashMap<String, usize> = HashMap::new();

    let mut absorb_rows = |rows: Vec<SearchRow>, is_image: bool| {
        for row in rows {
            match index_of.entry(row.id.clone()) {
                Entry::Occupied(slot) => {
                    let existing = &mut merged[*slot.get()];
                    if is_image {
                        existing.img_score = Some(row.score);
                    } else {
                        existing.text_score = Some(row.score);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(merged.len());
                    merged.push(RankedResult {
                        id: row.id,
                        img_score: is_image.then_some(row.score),
                        text_score: (!is_image).then_some(row.score),
                        combined_score: 0.0,
                        payload: row.payload,
                    });
                }
            }
        }
    };

    absorb_rows(image_rows, true);
    absorb_rows(text_rows, false);

    merged
}
