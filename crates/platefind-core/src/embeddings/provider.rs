//! Embedding provider abstraction
//!
//! The search engine only sees this trait; the concrete provider (a remote
//! multimodal model behind HTTP) is injected by the application.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::{PlatefindError, Result};

/// Produces fixed-dimension embeddings for image and/or text inputs.
pub trait EmbeddingProvider {
    /// Embed the supplied modalities.
    ///
    /// Fails with `EmbeddingUnavailable` on provider error. A successful
    /// call may still return a pair with one side missing (e.g. no text
    /// was supplied); callers must check `EmbeddingPair::is_empty`.
    fn embed(&self, image: Option<&ImagePayload>, text: Option<&str>) -> Result<EmbeddingPair>;
}

/// Embeddings returned by a provider, one slot per modality
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingPair {
    pub image_vector: Option<Vec<f32>>,
    pub text_vector: Option<Vec<f32>>,
}

impl EmbeddingPair {
    /// True if neither modality produced a vector
    pub fn is_empty(&self) -> bool {
        self.image_vector.is_none() && self.text_vector.is_none()
    }
}

/// Decoded image bytes ready to hand to an embedding provider
#[derive(Debug, Clone)]
pub struct ImagePayload {
    bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Decode an inline `data:image/...;base64,<data>` URI.
    ///
    /// Malformed headers or base64 surface as `EmbeddingUnavailable` since
    /// the request cannot produce an image vector.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let (header, encoded) = uri.split_once(',').ok_or_else(|| {
            PlatefindError::EmbeddingUnavailable("malformed data URI: missing comma".to_string())
        })?;

        if !header.starts_with("data:image") || !header.ends_with(";base64") {
            return Err(PlatefindError::EmbeddingUnavailable(format!(
                "unsupported data URI header: {header}"
            )));
        }

        let bytes = BASE64.decode(encoded.trim()).map_err(|e| {
            PlatefindError::EmbeddingUnavailable(format!("invalid base64 image data: {e}"))
        })?;

        if bytes.is_empty() {
            return Err(PlatefindError::EmbeddingUnavailable(
                "empty image payload".to_string(),
            ));
        }

        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Base64 encoding for transport to the provider
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_round_trip() {
        let uri = format!("data:image/jpeg;base64,{}", BASE64.encode(b"fake jpeg"));
        let payload = ImagePayload::from_data_uri(&uri).unwrap();
        assert_eq!(payload.as_bytes(), b"fake jpeg");
        assert_eq!(payload.to_base64(), BASE64.encode(b"fake jpeg"));
    }

    #[test]
    fn test_data_uri_rejects_missing_comma() {
        let err = ImagePayload::from_data_uri("data:image/pngbase64abc").unwrap_err();
        assert!(matches!(err, PlatefindError::EmbeddingUnavailable(_)));
    }

    #[test]
    fn test_data_uri_rejects_non_image() {
        let uri = format!("data:text/plain;base64,{}", BASE64.encode(b"hello"));
        assert!(ImagePayload::from_data_uri(&uri).is_err());
    }

    #[test]
    fn test_data_uri_rejects_bad_base64() {
        assert!(ImagePayload::from_data_uri("data:image/png;base64,!!!not-base64!!!").is_err());
    }

    #[test]
    fn test_empty_pair() {
        assert!(EmbeddingPair::default().is_empty());
        let pair = EmbeddingPair {
            image_vector: None,
            text_vector: Some(vec![0.0; 4]),
        };
        assert!(!pair.is_empty());
    }
}
