pub mod disk;
pub mod memory;

pub use disk::DiskVectorStore;
pub use memory::InMemoryVectorStore;

use crate::models::{IndexEntry, ScoredChunk};

pub(crate) fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm: f32 = left.iter().map(|value| value * value).sum::<f32>().sqrt();
    let right_norm: f32 = right.iter().map(|value| value * value).sum::<f32>().sqrt();

    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm * right_norm)
}

/// Scores every entry against the query vector and returns the best
/// `top_k` in descending-similarity order. Fewer entries than `top_k`
/// simply yields a shorter list.
pub(crate) fn rank_entries(
    entries: &[IndexEntry],
    vector: &[f32],
    top_k: usize,
) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = entries
        .iter()
        .map(|entry| ScoredChunk {
            chunk: entry.chunk.clone(),
            score: cosine_similarity(&entry.vector, vector),
        })
        .collect();

    scored.sort_by(|left, right| right.score.total_cmp(&left.score));
    scored.truncate(top_k);
    scored
}
