use serde::{Deserialize, Serialize};

/// Result of a hybrid search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Ranked results, best first
    pub results: Vec<RankedResult>,
    /// Number of results returned
    pub total: usize,
    /// Query execution time in milliseconds
    pub query_time_ms: u64,
}

/// A merged candidate that passed the validity filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    /// Document ID
    pub id: String,
    /// Similarity from the image-vector search, if that search returned it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_score: Option<f32>,
    /// Similarity from the text-vector search, if that search returned it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_score: Option<f32>,
    /// Weighted combination of the per-modality scores
    pub combined_score: f32,
    /// Opaque display fields, passed through from the store
    pub payload: serde_json::Value,
}

impl RankedResult {
    /// Display name, if the payload carries one
    pub fn name(&self) -> Option<&str> {
        self.payload.get("name").and_then(|v| v.as_str())
    }
}

impl SearchResult {
    /// Create an empty result
    pub fn empty() -> Self {
        Self {
            results: vec![],
            total: 0,
            query_time_ms: 0,
        }
    }

    /// Check if there are any results
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Format results as JSON
    pub fn format_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format results for human-readable output
    pub fn format_pretty(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Found {} results in {:.1}ms\n",
            self.results.len(),
            self.query_time_ms as f64
        ));
        output.push_str(&"─".repeat(50));
        output.push('\n');

        for (i, result) in self.results.iter().enumerate() {
            let name = result.name().unwrap_or(&result.id);
            output.push_str(&format!("\n{}. {}\n", i + 1, name));
            output.push_str(&format!("   Combined: {:.3}", result.combined_score));
            if let Some(s) = result.img_score {
                output.push_str(&format!("  image: {s:.3}"));
            }
            if let Some(s) = result.text_score {
                output.push_str(&format!("  text: {s:.3}"));
            }
            output.push('\n');

            if let Some(category) = result.payload.get("category").and_then(|v| v.as_str()) {
                output.push_str(&format!("   Category: {category}\n"));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SearchResult {
        SearchResult {
            results: vec![RankedResult {
                id: "meal-1".to_string(),
                img_score: Some(0.9),
                text_score: Some(0.4),
                combined_score: 0.65,
                payload: serde_json::json!({ "name": "Katsu Curry", "category": "Chicken" }),
            }],
            total: 1,
            query_time_ms: 12,
        }
    }

    #[test]
    fn test_format_pretty() {
        let output = sample().format_pretty();
        assert!(output.contains("Found 1 results"));
        assert!(output.contains("Katsu Curry"));
        assert!(output.contains("Combined: 0.650"));
        assert!(output.contains("Category: Chicken"));
    }

    #[test]
    fn test_json_omits_missing_scores() {
        let mut result = sample();
        result.results[0].img_score = None;
        let json = result.format_json();
        assert!(!json.contains("img_score"));
        assert!(json.contains("text_score"));
    }
}
