use crate::models::{IndexEntry, ScoredChunk};
use crate::QueryError;
use async_trait::async_trait;

/// Nearest-neighbor index over embedded chunks.
///
/// `query` returns hits in the index's own descending-similarity order;
/// callers must not re-rank. A result set shorter than `top_k` means the
/// corpus is sparse, not that the call failed.
#[async_trait]
pub trait VectorIndex {
    async fn upsert(&self, entries: &[IndexEntry]) -> Result<(), QueryError>;

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, QueryError>;
}

/// Text-generation capability: one prompt in, one answer out.
#[async_trait]
pub trait Generator {
    async fn generate(&self, prompt: &str) -> Result<String, QueryError>;
}
