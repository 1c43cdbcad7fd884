//! Property tests for the segmenter.

use proptest::prelude::*;
use ragcore::{Document, Segmenter};

/// Valid `(chunk_size, overlap)` pairs: positive size, overlap strictly
/// smaller.
fn arb_sizing() -> impl Strategy<Value = (usize, usize)> {
    (2usize..60).prop_flat_map(|chunk_size| (Just(chunk_size), 0..chunk_size))
}

fn span_of(chunk: &ragcore::Chunk) -> (usize, usize) {
    let start: usize = chunk.metadata["start_offset"].parse().unwrap();
    let end: usize = chunk.metadata["end_offset"].parse().unwrap();
    (start, end)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Emitted spans cover the whole text: any gap between consecutive
    /// spans holds only whitespace, and each span's trimmed slice equals
    /// the chunk text. Nothing outside overlaps is silently dropped.
    #[test]
    fn spans_cover_text_up_to_whitespace(
        text in "[ a-zA-Z.\n]{0,300}",
        (chunk_size, overlap) in arb_sizing(),
    ) {
        let segmenter = Segmenter::new(chunk_size, overlap).unwrap();
        let chunks = segmenter.segment(&Document::new("doc_1", text.clone()));
        let all: Vec<char> = text.chars().collect();

        let mut covered_to = 0usize;
        for chunk in &chunks {
            let (start, end) = span_of(chunk);
            prop_assert!(start < end);
            if start > covered_to {
                prop_assert!(all[covered_to..start].iter().all(|c| c.is_whitespace()));
            }
            let span: String = all[start..end].iter().collect();
            prop_assert_eq!(span.trim(), chunk.text.as_str());
            covered_to = covered_to.max(end);
        }
        if text.trim().is_empty() {
            prop_assert!(chunks.is_empty());
        } else {
            prop_assert!(all[covered_to..].iter().all(|c| c.is_whitespace()));
        }
    }

    /// Sequence indices start at 0 and increase strictly, and spans
    /// advance strictly through the text.
    #[test]
    fn sequence_indices_and_spans_strictly_increase(
        text in "[ a-z.\n]{0,300}",
        (chunk_size, overlap) in arb_sizing(),
    ) {
        let segmenter = Segmenter::new(chunk_size, overlap).unwrap();
        let chunks = segmenter.segment(&Document::new("doc_1", text));

        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.sequence_index, i);
        }
        for pair in chunks.windows(2) {
            let (prev_start, _) = span_of(&pair[0]);
            let (next_start, _) = span_of(&pair[1]);
            prop_assert!(next_start > prev_start);
        }
    }

    /// No chunk exceeds the configured size, chunks are trimmed and
    /// non-empty, and text at most `chunk_size` long yields one chunk.
    #[test]
    fn chunk_sizing_invariants(
        text in "[ a-zA-Z0-9é日.\n]{0,200}",
        (chunk_size, overlap) in arb_sizing(),
    ) {
        let segmenter = Segmenter::new(chunk_size, overlap).unwrap();
        let chunks = segmenter.segment(&Document::new("doc_1", text.clone()));

        for chunk in &chunks {
            prop_assert!(chunk.text.chars().count() <= chunk_size);
            prop_assert_eq!(chunk.text.trim(), chunk.text.as_str());
            prop_assert!(!chunk.text.is_empty());
        }
        if !text.trim().is_empty() && text.chars().count() <= chunk_size {
            prop_assert_eq!(chunks.len(), 1);
        }
    }
}
