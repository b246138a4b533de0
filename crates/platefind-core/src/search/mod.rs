mod engine;
mod query;
mod results;

pub use engine::HybridSearchEngine;
pub use query::SearchQuery;
pub use results::{RankedResult, SearchResult};
