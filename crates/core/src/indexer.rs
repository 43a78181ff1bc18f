use crate::chunking::split_document;
use crate::embeddings::Embedder;
use crate::error::IngestError;
use crate::models::{Document, IndexEntry, IngestionOptions};
use crate::traits::VectorIndex;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct IndexSummary {
    pub documents: usize,
    pub chunks: usize,
    pub built_at: DateTime<Utc>,
}

/// Build phase: chunks every document, embeds every chunk, and upserts the
/// lot into the vector index in one pass. Chunk order within a document is
/// preserved; order across documents follows the input slice. Documents that
/// hold no text are filtered here as a backstop, and a corpus that leaves
/// nothing to index is refused rather than built empty.
pub async fn index_documents<E, V>(
    documents: &[Document],
    options: &IngestionOptions,
    embedder: &E,
    index: &V,
) -> Result<IndexSummary, IngestError>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
{
    let documents: Vec<&Document> = documents
        .iter()
        .filter(|document| !document.is_empty())
        .collect();

    if documents.is_empty() {
        return Err(IngestError::EmptyCorpus);
    }

    let mut chunks = Vec::new();
    for document in &documents {
        chunks.extend(split_document(document, options)?);
    }

    if chunks.is_empty() {
        return Err(IngestError::EmptyCorpus);
    }

    let mut entries = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let vector = embedder
            .embed(&chunk.text)
            .await
            .map_err(IngestError::Service)?;
        entries.push(IndexEntry { vector, chunk });
    }

    index.upsert(&entries).await.map_err(IngestError::Service)?;

    Ok(IndexSummary {
        documents: documents.len(),
        chunks: entries.len(),
        built_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentMetadata;
    use crate::stores::InMemoryVectorStore;
    use crate::QueryError;
    use async_trait::async_trait;

    /// Deterministic stand-in embedder: hashes the text into a small unit
    /// vector.
    struct HashEmbedder;

    #[async_trait]
    impl Embedder for HashEmbedder {
        fn dimensions(&self) -> usize {
            8
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, QueryError> {
            let hash = text
                .bytes()
                .fold(0u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(byte as u64));
            let mut vector: Vec<f32> = (0..8)
                .map(|index| ((hash.wrapping_add(index) % 97) as f32).sin())
                .collect();
            let norm: f32 = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
            if norm > 0.0 {
                vector.iter_mut().for_each(|value| *value /= norm);
            }
            Ok(vector)
        }
    }

    fn document(source: &str, text: &str) -> Document {
        Document {
            text: text.to_string(),
            metadata: DocumentMetadata {
                source: source.to_string(),
                file_path: format!("/docs/{source}"),
            },
        }
    }

    #[tokio::test]
    async fn empty_document_list_is_refused() {
        let index = InMemoryVectorStore::new();
        let result =
            index_documents(&[], &IngestionOptions::default(), &HashEmbedder, &index).await;
        assert!(matches!(result, Err(IngestError::EmptyCorpus)));
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn whitespace_only_documents_are_refused() {
        let index = InMemoryVectorStore::new();
        let documents = vec![document("blank.pdf", "   \n ")];
        let result = index_documents(
            &documents,
            &IngestionOptions::default(),
            &HashEmbedder,
            &index,
        )
        .await;
        assert!(matches!(result, Err(IngestError::EmptyCorpus)));
    }

    #[tokio::test]
    async fn every_chunk_from_every_document_is_indexed() {
        let index = InMemoryVectorStore::new();
        let documents = vec![
            document("a.pdf", "Revenue grew 10% in Q1."),
            document("b.pdf", "Revenue grew 12% in Q2."),
        ];

        let summary = index_documents(
            &documents,
            &IngestionOptions::default(),
            &HashEmbedder,
            &index,
        )
        .await
        .expect("build");

        assert_eq!(summary.documents, 2);
        assert_eq!(summary.chunks, 2);
        assert_eq!(index.len().await, 2);
    }

    #[tokio::test]
    async fn indexed_chunks_keep_their_source_metadata() {
        let index = InMemoryVectorStore::new();
        let documents = vec![document("a.pdf", "Revenue grew 10% in Q1.")];

        index_documents(
            &documents,
            &IngestionOptions::default(),
            &HashEmbedder,
            &index,
        )
        .await
        .expect("build");

        let vector = HashEmbedder
            .embed("Revenue grew 10% in Q1.")
            .await
            .expect("embed");
        let hits = index.query(&vector, 1).await.expect("query");
        assert_eq!(hits[0].chunk.metadata.source, "a.pdf");
    }
}
