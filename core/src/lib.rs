pub mod concurrent_map;
pub mod index;
pub mod query;
pub mod search;
pub mod tokenizer;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use concurrent_map::ConcurrentMap;
pub use index::InvertedIndex;
pub use query::Query;
pub use search::{ExecutionPolicy, SearchServer};

/// Document identifier. Signed so that negative ids can be rejected at the
/// boundary instead of silently wrapping.
pub type DocId = i64;

/// Lifecycle status of an indexed document, assigned at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStatus {
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

/// A single ranked search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Bad ingestion input or malformed query syntax.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The referenced document id is not in the corpus.
    #[error("document {0} is not in the index")]
    DocumentNotFound(DocId),
}
