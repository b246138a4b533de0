use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatefindError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Vector search unavailable: {0}")]
    SearchUnavailable(String),

    #[error("Unknown vector index: {0}")]
    UnknownIndex(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Store not found: {0}")]
    StoreNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, PlatefindError>;
