use crate::embeddings::Embedder;
use crate::models::ScoredChunk;
use crate::traits::VectorIndex;
use crate::QueryError;

pub const DEFAULT_TOP_K: usize = 4;

/// Embeds a question and hands ranking entirely to the vector index: hits
/// come back in the index's descending-similarity order and are not
/// re-ranked here. A sparse corpus returning fewer than `top_k` hits is
/// passed through as-is.
pub struct Retriever<E, V> {
    embedder: E,
    index: V,
    top_k: usize,
}

impl<E, V> Retriever<E, V>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
{
    pub fn new(embedder: E, index: V) -> Self {
        Self {
            embedder,
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>, QueryError> {
        let vector = self.embedder.embed(question).await?;
        self.index.query(&vector, self.top_k).await
    }
}
