use crate::models::{IndexEntry, ScoredChunk};
use crate::traits::VectorIndex;
use crate::QueryError;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Vector index with the same contract as the disk store but no
/// persistence. Handy for tests and throwaway sessions.
#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<Vec<IndexEntry>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorStore {
    async fn upsert(&self, entries: &[IndexEntry]) -> Result<(), QueryError> {
        let mut stored = self.entries.write().await;
        for entry in entries {
            stored.retain(|existing| existing.chunk.chunk_id != entry.chunk.chunk_id);
            stored.push(entry.clone());
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, QueryError> {
        let entries = self.entries.read().await;
        Ok(super::rank_entries(&entries, vector, top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chunk, DocumentMetadata};

    fn entry(chunk_id: &str, vector: Vec<f32>) -> IndexEntry {
        IndexEntry {
            vector,
            chunk: Chunk {
                chunk_id: chunk_id.to_string(),
                chunk_index: 0,
                text: chunk_id.to_string(),
                metadata: DocumentMetadata {
                    source: "a.pdf".to_string(),
                    file_path: "/docs/a.pdf".to_string(),
                },
            },
        }
    }

    #[tokio::test]
    async fn query_on_an_empty_store_returns_nothing() {
        let store = InMemoryVectorStore::new();
        let hits = store.query(&[1.0, 0.0], 4).await.expect("query");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn upsert_then_query_ranks_by_similarity() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(&[entry("far", vec![0.0, 1.0]), entry("near", vec![1.0, 0.0])])
            .await
            .expect("upsert");

        let hits = store.query(&[1.0, 0.1], 2).await.expect("query");
        assert_eq!(hits[0].chunk.chunk_id, "near");
    }
}
