use crate::models::{Confidence, ScoredChunk};
use std::collections::HashSet;

/// Derives a confidence label and the distinct source files from a
/// retrieved set.
///
/// The label is keyed on retrieved-chunk count alone — a proxy for
/// relevance that never inspects the similarity scores riding on the
/// chunks. Three or more chunks reads as corroboration across sources, one
/// or two as partial coverage, none as no usable context.
pub fn assess(retrieved: &[ScoredChunk]) -> (Confidence, Vec<String>) {
    let mut seen = HashSet::new();
    let mut source_files = Vec::new();
    for scored in retrieved {
        let source = &scored.chunk.metadata.source;
        if seen.insert(source.as_str()) {
            source_files.push(source.clone());
        }
    }

    let confidence = match retrieved.len() {
        0 => Confidence::Low,
        1 | 2 => Confidence::Medium,
        _ => Confidence::High,
    };

    (confidence, source_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chunk, DocumentMetadata};

    fn scored(source: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                chunk_id: format!("{source}-0"),
                chunk_index: 0,
                text: "chunk text".to_string(),
                metadata: DocumentMetadata {
                    source: source.to_string(),
                    file_path: format!("/docs/{source}"),
                },
            },
            score: 0.5,
        }
    }

    #[test]
    fn nothing_retrieved_is_low_with_no_sources() {
        let (confidence, sources) = assess(&[]);
        assert_eq!(confidence, Confidence::Low);
        assert!(sources.is_empty());
    }

    #[test]
    fn one_chunk_is_medium() {
        let (confidence, _) = assess(&[scored("a.pdf")]);
        assert_eq!(confidence, Confidence::Medium);
    }

    #[test]
    fn two_chunks_are_medium() {
        let (confidence, _) = assess(&[scored("a.pdf"), scored("b.pdf")]);
        assert_eq!(confidence, Confidence::Medium);
    }

    #[test]
    fn three_chunks_are_high() {
        let (confidence, _) = assess(&[scored("a.pdf"), scored("b.pdf"), scored("c.pdf")]);
        assert_eq!(confidence, Confidence::High);
    }

    #[test]
    fn duplicate_sources_collapse_to_one() {
        let (_, sources) = assess(&[scored("a.pdf"), scored("a.pdf")]);
        assert_eq!(sources, vec!["a.pdf".to_string()]);
    }

    #[test]
    fn sources_keep_first_seen_order() {
        let (_, sources) = assess(&[scored("b.pdf"), scored("a.pdf"), scored("b.pdf")]);
        assert_eq!(sources, vec!["b.pdf".to_string(), "a.pdf".to_string()]);
    }
}
