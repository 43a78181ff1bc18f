use crate::error::IngestError;
use crate::models::{Chunk, Document, IngestionOptions};
use sha2::{Digest, Sha256};

/// Separator priority for recursive splitting: paragraph break, line break,
/// word break. A text with none of these left falls back to a hard
/// character window.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl From<IngestionOptions> for ChunkingConfig {
    fn from(value: IngestionOptions) -> Self {
        Self {
            max_chars: value.chunk_max_chars,
            overlap_chars: value.chunk_overlap_chars,
        }
    }
}

impl ChunkingConfig {
    fn validate(&self) -> Result<(), IngestError> {
        if self.max_chars == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "max_chars must be positive".to_string(),
            ));
        }
        if self.overlap_chars >= self.max_chars {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap {} must be smaller than max chunk size {}",
                self.overlap_chars, self.max_chars
            )));
        }
        Ok(())
    }
}

/// Splits `text` into chunks of at most `max_chars` characters, adjacent
/// chunks sharing the final `overlap_chars` characters of the earlier chunk.
///
/// Splitting is recursive: the text is decomposed along the largest separator
/// that still yields pieces small enough to merge, and pieces are merged back
/// greedily. Separators stay attached to their piece, so every chunk is a
/// contiguous slice of the input. Whitespace-only input yields no chunks;
/// input already within `max_chars` is returned as a single chunk verbatim.
pub fn split_text(text: &str, config: ChunkingConfig) -> Result<Vec<String>, IngestError> {
    config.validate()?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    if char_len(text) <= config.max_chars {
        return Ok(vec![text.to_string()]);
    }

    // Units are capped below max so a fresh chunk seeded with the previous
    // chunk's overlap tail can always absorb at least one unit.
    let unit_limit = config.max_chars - config.overlap_chars;
    let mut units = Vec::new();
    decompose(text, &SEPARATORS, unit_limit, &mut units);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for unit in units {
        let unit_len = char_len(unit);
        if current_len > 0 && current_len + unit_len > config.max_chars {
            let tail = char_tail(&current, config.overlap_chars);
            chunks.push(std::mem::take(&mut current));
            current_len = char_len(&tail);
            current = tail;
        }
        current.push_str(unit);
        current_len += unit_len;
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}

/// Cuts `text` into consecutive pieces of at most `limit` characters, trying
/// separators in priority order and only recursing into pieces that are
/// still too large. Concatenating the output reproduces `text` exactly.
fn decompose<'a>(text: &'a str, separators: &[&str], limit: usize, out: &mut Vec<&'a str>) {
    if char_len(text) <= limit {
        out.push(text);
        return;
    }

    let Some((separator, rest)) = separators.split_first() else {
        hard_window(text, limit, out);
        return;
    };

    if !text.contains(separator) {
        decompose(text, rest, limit, out);
        return;
    }

    for piece in text.split_inclusive(separator) {
        if char_len(piece) <= limit {
            out.push(piece);
        } else {
            decompose(piece, rest, limit, out);
        }
    }
}

/// Last-resort split for separator-free text (one unbroken run of
/// characters): fixed windows of `limit` characters on char boundaries.
fn hard_window<'a>(text: &'a str, limit: usize, out: &mut Vec<&'a str>) {
    let mut boundaries: Vec<usize> = text.char_indices().map(|(index, _)| index).collect();
    boundaries.push(text.len());

    let mut start = 0;
    while start < boundaries.len() - 1 {
        let end = (start + limit).min(boundaries.len() - 1);
        out.push(&text[boundaries[start]..boundaries[end]]);
        start = end;
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn char_tail(text: &str, count: usize) -> String {
    let total = char_len(text);
    if total <= count {
        return text.to_string();
    }
    let start = text
        .char_indices()
        .nth(total - count)
        .map(|(index, _)| index)
        .unwrap_or(0);
    text[start..].to_string()
}

/// Splits one document into chunks, every chunk carrying the document's
/// metadata unchanged and a stable content-derived id.
pub fn split_document(
    document: &Document,
    options: &IngestionOptions,
) -> Result<Vec<Chunk>, IngestError> {
    let config = ChunkingConfig::from(*options);
    let pieces = split_text(&document.text, config)?;

    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let chunk_index = index as u64;
            Chunk {
                chunk_id: make_chunk_id(&document.metadata.source, chunk_index, &text),
                chunk_index,
                text,
                metadata: document.metadata.clone(),
            }
        })
        .collect())
}

fn make_chunk_id(source: &str, index: u64, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
