//! Remote multimodal embedding client
//!
//! Speaks a minimal JSON shape to an HTTP embedding service: POST
//! `{ "text": ..., "image": "<base64>", "dimension": N }`, expecting
//! `{ "image_embedding": [...], "text_embedding": [...] }` with either
//! side optional.

use std::time::Duration;

use serde::Deserialize;

use crate::config::EmbeddingConfig;
use crate::error::{PlatefindError, Result};

use super::{EmbeddingPair, EmbeddingProvider, ImagePayload};

pub struct RemoteEmbedder {
    endpoint: String,
    dimension: usize,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for RemoteEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEmbedder")
            .field("endpoint", &self.endpoint)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    image_embedding: Option<Vec<f32>>,
    #[serde(default)]
    text_embedding: Option<Vec<f32>>,
}

impl RemoteEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatefindError::Config(format!("embedding http client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            dimension: config.dimension,
            client,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(PlatefindError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }
        Ok(())
    }
}

impl EmbeddingProvider for RemoteEmbedder {
    fn embed(&self, image: Option<&ImagePayload>, text: Option<&str>) -> Result<EmbeddingPair> {
        let mut body = serde_json::json!({ "dimension": self.dimension });
        if let Some(text) = text {
            body["text"] = serde_json::Value::String(text.to_string());
        }
        if let Some(image) = image {
            body["image"] = serde_json::Value::String(image.to_base64());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| {
                PlatefindError::EmbeddingUnavailable(format!("embedding request failed: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(PlatefindError::EmbeddingUnavailable(format!(
                "embedding service HTTP {}",
                response.status()
            )));
        }

        let parsed: EmbedResponse = response.json().map_err(|e| {
            PlatefindError::EmbeddingUnavailable(format!("embedding response parse: {e}"))
        })?;

        if let Some(ref v) = parsed.image_embedding {
            self.check_dimension(v)?;
        }
        if let Some(ref v) = parsed.text_embedding {
            self.check_dimension(v)?;
        }

        Ok(EmbeddingPair {
            // Only trust an image vector if we actually sent an image
            image_vector: if image.is_some() {
                parsed.image_embedding
            } else {
                None
            },
            text_vector: if text.is_some() {
                parsed.text_embedding
            } else {
                None
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn config(endpoint: String, dimension: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            endpoint,
            dimension,
            timeout_secs: 2,
            cache_mb: 1,
        }
    }

    #[test]
    fn test_text_only_embed() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/embed")
                .json_body_partial(r#"{"text": "chicken curry", "dimension": 4}"#);
            then.status(200)
                .json_body(serde_json::json!({ "text_embedding": [0.1, 0.2, 0.3, 0.4] }));
        });

        let embedder = RemoteEmbedder::new(&config(server.url("/embed"), 4)).unwrap();
        let pair = embedder.embed(None, Some("chicken curry")).unwrap();

        mock.assert();
        assert_eq!(pair.text_vector.as_deref(), Some(&[0.1, 0.2, 0.3, 0.4][..]));
        assert!(pair.image_vector.is_none());
    }

    #[test]
    fn test_both_modalities_embed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/embed");
            then.status(200).json_body(serde_json::json!({
                "image_embedding": [1.0, 0.0],
                "text_embedding": [0.0, 1.0],
            }));
        });

        let embedder = RemoteEmbedder::new(&config(server.url("/embed"), 2)).unwrap();
        let image = ImagePayload::from_bytes(vec![0xff, 0xd8]);
        let pair = embedder.embed(Some(&image), Some("soup")).unwrap();

        assert!(pair.image_vector.is_some());
        assert!(pair.text_vector.is_some());
    }

    #[test]
    fn test_http_error_maps_to_embedding_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/embed");
            then.status(503);
        });

        let embedder = RemoteEmbedder::new(&config(server.url("/embed"), 4)).unwrap();
        let err = embedder.embed(None, Some("soup")).unwrap_err();
        assert!(matches!(err, PlatefindError::EmbeddingUnavailable(_)));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/embed");
            then.status(200)
                .json_body(serde_json::json!({ "text_embedding": [0.1, 0.2] }));
        });

        let embedder = RemoteEmbedder::new(&config(server.url("/embed"), 4)).unwrap();
        let err = embedder.embed(None, Some("soup")).unwrap_err();
        assert!(matches!(
            err,
            PlatefindError::DimensionMismatch { expected: 4, got: 2 }
        ));
    }
}
