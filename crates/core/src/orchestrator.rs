use crate::embeddings::Embedder;
use crate::models::{Confidence, QueryResult, ScoredChunk};
use crate::relevance::assess;
use crate::retrieval::Retriever;
use crate::synthesis::synthesize;
use crate::traits::{Generator, VectorIndex};
use crate::QueryError;

/// The states a question moves through. Each stage consumes the previous
/// record and produces the next, so a later stage cannot touch a field an
/// earlier stage owns — the linear order is enforced by the types, not by
/// convention.
pub struct PendingQuestion {
    pub question: String,
}

pub struct RetrievedContext {
    pub question: String,
    pub retrieved_chunks: Vec<ScoredChunk>,
}

pub struct AssessedContext {
    pub question: String,
    pub retrieved_chunks: Vec<ScoredChunk>,
    pub confidence: Confidence,
    pub source_files: Vec<String>,
}

pub struct AnsweredQuestion {
    pub question: String,
    pub retrieved_chunks: Vec<ScoredChunk>,
    pub confidence: Confidence,
    pub source_files: Vec<String>,
    pub answer: String,
}

impl From<AnsweredQuestion> for QueryResult {
    fn from(state: AnsweredQuestion) -> Self {
        QueryResult {
            question: state.question,
            answer: state.answer,
            confidence: state.confidence,
            source_files: state.source_files,
            num_sources: state.retrieved_chunks.len(),
        }
    }
}

/// Runs one question through the fixed pipeline:
/// retrieve → assess relevance → generate answer. No branches, no retries;
/// a failing stage aborts the question and nothing partial escapes.
pub struct QueryWorkflow<E, V, G> {
    retriever: Retriever<E, V>,
    generator: G,
}

impl<E, V, G> QueryWorkflow<E, V, G>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
    G: Generator + Send + Sync,
{
    pub fn new(retriever: Retriever<E, V>, generator: G) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    pub async fn process_question(&self, question: &str) -> Result<QueryResult, QueryError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::EmptyQuestion);
        }

        let state = PendingQuestion {
            question: question.to_string(),
        };
        let state = self.retrieve_documents(state).await?;
        let state = analyze_relevance(state);
        let state = self.generate_answer(state).await?;
        Ok(state.into())
    }

    async fn retrieve_documents(
        &self,
        state: PendingQuestion,
    ) -> Result<RetrievedContext, QueryError> {
        let retrieved_chunks = self.retriever.retrieve(&state.question).await?;
        Ok(RetrievedContext {
            question: state.question,
            retrieved_chunks,
        })
    }

    async fn generate_answer(&self, state: AssessedContext) -> Result<AnsweredQuestion, QueryError> {
        let answer = synthesize(&self.generator, &state.question, &state.retrieved_chunks).await?;
        Ok(AnsweredQuestion {
            question: state.question,
            retrieved_chunks: state.retrieved_chunks,
            confidence: state.confidence,
            source_files: state.source_files,
            answer,
        })
    }
}

fn analyze_relevance(state: RetrievedContext) -> AssessedContext {
    let (confidence, source_files) = assess(&state.retrieved_chunks);
    AssessedContext {
        question: state.question,
        retrieved_chunks: state.retrieved_chunks,
        confidence,
        source_files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::index_documents;
    use crate::models::{Document, DocumentMetadata, IndexEntry, IngestionOptions};
    use crate::stores::InMemoryVectorStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Deterministic embedder: a tiny unit vector derived from the text.
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

    /// Generator that echoes the prompt and counts invocations, so tests can
    /// check both what it was asked and whether it was asked at all.
    #[derive(Clone, Default)]
    struct EchoGenerator {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(prompt.to_string())
        }
    }

    /// Index whose queries always fail, standing in for a store that was
    /// never built.
    struct UnbuiltIndex;

    #[async_trait]
    impl VectorIndex for UnbuiltIndex {
        async fn upsert(&self, _entries: &[IndexEntry]) -> Result<(), QueryError> {
            Ok(())
        }

        async fn query(
            &self,
            _vector: &[f32],
            _top_k: usize,
        ) -> Result<Vec<ScoredChunk>, QueryError> {
            Err(QueryError::IndexNotReady("no index file".to_string()))
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

    async fn indexed_store(documents: &[Document]) -> InMemoryVectorStore {
        let index = InMemoryVectorStore::new();
        index_documents(documents, &IngestionOptions::default(), &HashEmbedder, &index)
            .await
            .expect("build");
        index
    }

    #[tokio::test]
    async fn two_single_chunk_documents_answer_with_both_sources() {
        let documents = vec![
            document("a.pdf", "Revenue grew 10% in Q1."),
            document("b.pdf", "Revenue grew 12% in Q2."),
        ];
        let index = indexed_store(&documents).await;

        let workflow = QueryWorkflow::new(Retriever::new(HashEmbedder, index), EchoGenerator::default());
        let result = workflow
            .process_question("How did revenue change?")
            .await
            .expect("process");

        assert_eq!(result.question, "How did revenue change?");
        assert_eq!(result.num_sources, 2);
        assert_eq!(result.confidence, Confidence::Medium);
        let mut sources = result.source_files.clone();
        sources.sort();
        assert_eq!(sources, vec!["a.pdf".to_string(), "b.pdf".to_string()]);
        assert!(result.answer.contains("From a.pdf:"));
        assert!(result.answer.contains("From b.pdf:"));
    }

    #[tokio::test]
    async fn empty_question_fails_before_any_capability_runs() {
        let generator = EchoGenerator::default();
        let workflow = QueryWorkflow::new(
            Retriever::new(HashEmbedder, InMemoryVectorStore::new()),
            generator.clone(),
        );

        let result = workflow.process_question("   ").await;
        assert!(matches!(result, Err(QueryError::EmptyQuestion)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn retrieval_failure_aborts_without_generating() {
        let generator = EchoGenerator::default();
        let workflow =
            QueryWorkflow::new(Retriever::new(HashEmbedder, UnbuiltIndex), generator.clone());

        let result = workflow.process_question("How did revenue change?").await;
        assert!(matches!(result, Err(QueryError::IndexNotReady(_))));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_retrieval_is_low_confidence_but_still_generates() {
        let generator = EchoGenerator::default();
        let workflow = QueryWorkflow::new(
            Retriever::new(HashEmbedder, InMemoryVectorStore::new()),
            generator.clone(),
        );

        let result = workflow
            .process_question("Is anything indexed?")
            .await
            .expect("process");

        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.num_sources, 0);
        assert!(result.source_files.is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn three_or_more_retrieved_chunks_read_as_high_confidence() {
        let documents = vec![
            document("a.pdf", "Margins expanded in the north region."),
            document("b.pdf", "Margins expanded in the south region."),
            document("c.pdf", "Margins expanded in the west region."),
        ];
        let index = indexed_store(&documents).await;

        let workflow = QueryWorkflow::new(Retriever::new(HashEmbedder, index), EchoGenerator::default());
        let result = workflow
            .process_question("What happened to margins?")
            .await
            .expect("process");

        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.num_sources, 3);
    }
}
