use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub source: String,
    pub file_path: String,
}

/// One ingested PDF: the full extracted text plus where it came from.
/// Produced during extraction, consumed by the chunker, never indexed whole.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub chunk_id: String,
    pub chunk_index: u64,
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// What the vector index stores: the embedding plus the owning chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub chunk: Chunk,
}

/// A retrieved chunk with the index's raw similarity score attached.
/// The score is not consulted by the confidence heuristic today, but it is
/// carried so a score-aware heuristic can be layered without changing the
/// retrieval contract.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            Confidence::High => "High - Found multiple relevant sources",
            Confidence::Medium => "Medium - Found some relevant information",
            Confidence::Low => "Low - Limited relevant information found",
        };
        write!(f, "{phrase}")
    }
}

/// The externally visible outcome of one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub question: String,
    pub answer: String,
    pub confidence: Confidence,
    pub source_files: Vec<String>,
    pub num_sources: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct IngestionOptions {
    pub chunk_max_chars: usize,
    pub chunk_overlap_chars: usize,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            chunk_max_chars: 1_000,
            chunk_overlap_chars: 200,
        }
    }
}
