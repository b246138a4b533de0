use serde::{Deserialize, Serialize};

/// A document as supplied to the store at import time.
///
/// Only `id` and the two optional embeddings are structured; every other
/// field is carried through as an opaque display payload (name, category,
/// image URL, ...) and returned untouched with search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable, unique identifier
    pub id: String,

    /// Image-modality embedding, if the import pipeline produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_embedding: Option<Vec<f32>>,

    /// Text-modality embedding, if the import pipeline produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_embedding: Option<Vec<f32>>,

    /// Opaque display fields, passed through unchanged
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    /// Create a document with no embeddings
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image_embedding: None,
            text_embedding: None,
            payload: serde_json::Map::new(),
        }
    }

    pub fn with_image_embedding(mut self, vector: Vec<f32>) -> Self {
        self.image_embedding = Some(vector);
        self
    }

    pub fn with_text_embedding(mut self, vector: Vec<f32>) -> Self {
        self.text_embedding = Some(vector);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }
}
