use crate::embeddings::ImagePayload;
use crate::error::{PlatefindError, Result};

/// A hybrid search request: free text and/or an image, with per-modality
/// weights. At least one of `text`/`image` must be present and the weights
/// must sum to a strictly positive value.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub image: Option<ImagePayload>,
    pub image_weight: f32,
    pub text_weight: f32,
}

impl SearchQuery {
    /// Text-only query with full weight on the text modality
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
            image_weight: 0.0,
            text_weight: 1.0,
        }
    }

    /// Image-only query with full weight on the image modality
    pub fn image(image: ImagePayload) -> Self {
        Self {
            text: None,
            image: Some(image),
            image_weight: 1.0,
            text_weight: 0.0,
        }
    }

    /// Query over both modalities
    pub fn hybrid(text: impl Into<String>, image: ImagePayload) -> Self {
        Self {
            text: Some(text.into()),
            image: Some(image),
            image_weight: 0.5,
            text_weight: 0.5,
        }
    }

    pub fn with_weights(mut self, image_weight: f32, text_weight: f32) -> Self {
        self.image_weight = image_weight;
        self.text_weight = text_weight;
        self
    }

    /// Validate the query and return `(image_weight, text_weight)`
    /// normalized to sum to 1.
    pub fn normalized_weights(&self) -> Result<(f32, f32)> {
        if self.text.is_none() && self.image.is_none() {
            return Err(PlatefindError::InvalidInput(
                "query must include text or an image".to_string(),
            ));
        }

        if self.image_weight < 0.0 || self.text_weight < 0.0 {
            return Err(PlatefindError::InvalidInput(
                "weights must not be negative".to_string(),
            ));
        }

        let total = self.image_weight + self.text_weight;
        if !(total > 0.0) {
            return Err(PlatefindError::InvalidInput(
                "weights must sum to a positive value".to_string(),
            ));
        }

        Ok((self.image_weight / total, self.text_weight / total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_sums_to_one() {
        let query = SearchQuery::text("noodles").with_weights(3.0, 1.0);
        let (iw, tw) = query.normalized_weights().unwrap();
        assert!((iw + tw - 1.0).abs() < 1e-6);
        assert!((iw - 0.75).abs() < 1e-6);
        assert!((tw - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_empty_query_rejected() {
        let query = SearchQuery::default().with_weights(0.5, 0.5);
        assert!(matches!(
            query.normalized_weights(),
            Err(PlatefindError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_zero_weight_sum_rejected() {
        let query = SearchQuery::text("noodles").with_weights(0.0, 0.0);
        assert!(matches!(
            query.normalized_weights(),
            Err(PlatefindError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let query = SearchQuery::text("noodles").with_weights(2.0, -1.0);
        assert!(query.normalized_weights().is_err());
    }

    #[test]
    fn test_nan_weight_rejected() {
        let query = SearchQuery::text("noodles").with_weights(f32::NAN, 0.5);
        assert!(query.normalized_weights().is_err());
    }
}
