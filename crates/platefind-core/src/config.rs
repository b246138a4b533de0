use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global platefind configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Embedding provider configuration
    pub embedding: EmbeddingConfig,

    /// Vector store configuration
    pub store: StoreConfig,

    /// Search configuration
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// HTTP endpoint of the multimodal embedding service
    pub endpoint: String,

    /// Embedding dimension (must match the store's indexes)
    pub dimension: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Embedding cache size in megabytes
    pub cache_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base directory for store data
    pub data_dir: PathBuf,

    /// Name of the image-vector index
    pub image_index: String,

    /// Name of the text-vector index
    pub text_index: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default image weight when the caller does not supply one (0.0-1.0)
    pub image_weight: f32,

    /// Default text weight when the caller does not supply one (0.0-1.0)
    pub text_weight: f32,

    /// Default result limit
    pub default_k: usize,

    /// Maximum results
    pub max_k: usize,

    /// ANN candidate pool per modality search
    pub num_candidates: usize,

    /// Per-modality over-fetch multiplier applied to k before merging
    pub overfetch_factor: usize,

    /// Minimum combined score for a result to be returned (0.0-1.0)
    pub min_combined_score: f32,

    /// Minimum per-modality score when that modality carries weight (0.0-1.0)
    pub min_component_score: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            store: StoreConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8900/embed".to_string(),
            dimension: 512,
            timeout_secs: 10,
            cache_mb: 100,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            image_index: "image".to_string(),
            text_index: "text".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            image_weight: 0.5,
            text_weight: 0.5,
            default_k: 5,
            max_k: 100,
            num_candidates: 100,
            overfetch_factor: 3,
            min_combined_score: 0.25,
            min_component_score: 0.15,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("platefind")
}

impl Config {
    /// Load config from default locations (in order of precedence):
    /// 1. $PWD/.platefind.toml
    /// 2. $XDG_CONFIG_HOME/platefind/config.toml
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(content) = std::fs::read_to_string(".platefind.toml") {
            if let Ok(config) = toml::from_str(&content) {
                return config;
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("platefind").join("config.toml");
            if let Ok(content) = std::fs::read_to_string(&config_path) {
                if let Ok(config) = toml::from_str(&content) {
                    return config;
                }
            }
        }

        Self::default()
    }

    /// Load config from a specific file
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.embedding.dimension, 512);
        assert_eq!(config.search.min_combined_score, 0.25);
        assert_eq!(config.search.min_component_score, 0.15);
        assert_eq!(config.search.num_candidates, 100);
        assert_eq!(config.search.overfetch_factor, 3);
    }

    #[test]
    fn test_partial_config_parses() {
        let config: Config = toml::from_str(
            r#"
            [search]
            min_combined_score = 0.4
            "#,
        )
        .unwrap();
        assert_eq!(config.search.min_combined_score, 0.4);
        // Untouched sections keep defaults
        assert_eq!(config.search.min_component_score, 0.15);
        assert_eq!(config.embedding.timeout_secs, 10);
    }
}
