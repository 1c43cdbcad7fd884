//! Boundary-aware document segmentation.
//!
//! The [`Segmenter`] splits document text into overlapping chunks,
//! preferring to cut at natural boundaries near the chunk limit instead of
//! mid-word. The boundary search is a heuristic scan over a fixed lookback
//! window, not a sentence splitter: candidate delimiters are tried in
//! priority order (`.`, then newline, then any whitespace), and priority
//! dominates distance within the window.

use tracing::debug;

use crate::config::RagConfig;
use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// How far back (in characters) from the candidate cut point to search
/// for a natural boundary.
const BOUNDARY_LOOKBACK: usize = 100;

/// Splits document text into overlapping, boundary-aware chunks.
///
/// Sizes are measured in characters, so multi-byte text never gets cut on
/// a non-boundary. Construction validates that `overlap < chunk_size`;
/// per-call code relies on that invariant.
///
/// # Example
///
/// ```rust,ignore
/// use ragcore::{Document, Segmenter};
///
/// let segmenter = Segmenter::new(1000, 200)?;
/// let chunks = segmenter.segment(&Document::new("doc_1", text));
/// ```
#[derive(Debug, Clone)]
pub struct Segmenter {
    chunk_size: usize,
    overlap: usize,
}

impl Segmenter {
    /// Create a new `Segmenter`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `chunk_size` is zero
    /// or `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RagError::InvalidConfiguration(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Create a `Segmenter` from an already-validated [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` for empty or whitespace-only text, and
    /// exactly one chunk for text no longer than `chunk_size`. Each chunk
    /// carries the document's metadata plus `chunk_index`, `total_chunks`,
    /// and the char offsets (`start_offset`, `end_offset`) of its
    /// unstripped span. Embeddings are attached later by the pipeline.
    pub fn segment(&self, document: &Document) -> Vec<Chunk> {
        let spans = self.split_spans(&document.text);
        let total = spans.len();

        let chunks: Vec<Chunk> = spans
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), i.to_string());
                metadata.insert("total_chunks".to_string(), total.to_string());
                metadata.insert("start_offset".to_string(), span.start.to_string());
                metadata.insert("end_offset".to_string(), span.end.to_string());
                Chunk {
                    id: format!("{}_{i}", document.id),
                    text: span.text,
                    sequence_index: i,
                    document_id: document.id.clone(),
                    metadata,
                    embedding: Vec::new(),
                }
            })
            .collect();

        debug!(document.id = %document.id, chunk_count = chunks.len(), "segmented document");
        chunks
    }

    /// One pass over the text producing trimmed spans. Offsets are char
    /// indices into the original text; whitespace-only slices are skipped.
    fn split_spans(&self, text: &str) -> Vec<Span> {
        let indexed: Vec<(usize, char)> = text.char_indices().collect();
        let char_count = indexed.len();
        if char_count == 0 {
            return Vec::new();
        }
        let byte_at =
            |char_idx: usize| if char_idx == char_count { text.len() } else { indexed[char_idx].0 };

        let mut spans = Vec::new();
        let mut start = 0usize;

        loop {
            let mut end = (start + self.chunk_size).min(char_count);

            if end < char_count {
                let window_start = end.saturating_sub(BOUNDARY_LOOKBACK).max(start);
                if let Some(boundary) = find_boundary(&indexed, window_start, end) {
                    end = boundary + 1;
                }
            }

            let raw = &text[byte_at(start)..byte_at(end)];
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                spans.push(Span { text: trimmed.to_string(), start, end });
            }

            if end == char_count {
                break;
            }

            // Never move backward or stall: the next start must strictly
            // exceed the previous one.
            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
        }

        spans
    }
}

/// A trimmed slice of the source text together with the char offsets of
/// its unstripped span.
struct Span {
    text: String,
    start: usize,
    end: usize,
}

/// Search backward through chars `[window_start, end)` for the best cut
/// point. Candidate delimiters are tried in priority order; within one
/// class the match nearest to `end` wins.
fn find_boundary(indexed: &[(usize, char)], window_start: usize, end: usize) -> Option<usize> {
    let scan = |matches: fn(char) -> bool| {
        (window_start..end).rev().find(|&i| matches(indexed[i].1))
    };
    scan(|c| c == '.')
        .or_else(|| scan(|c| c == '\n'))
        .or_else(|| scan(char::is_whitespace))
}
