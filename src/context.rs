//! Context assembly: turning retrieved matches into a prompt context.

use tracing::debug;

use crate::config::RagConfig;
use crate::document::ScoredChunk;
use crate::error::{RagError, Result};

/// The assembled prompt context plus how many leading matches made it in.
///
/// `used` is always a prefix length of the input match list, so the
/// pipeline can report exactly the matches that back the answer.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// The concatenated context string.
    pub text: String,
    /// Number of leading matches included in `text`.
    pub used: usize,
}

/// Concatenates retrieved chunk texts into a single prompt context.
///
/// Each match becomes a block headed by its source document (the
/// original filename when the chunk metadata carries one), and blocks are
/// joined by a deterministic delimiter. The overall character budget is
/// enforced by dropping lowest-ranked matches whole; an individual
/// chunk's text is never cut mid-sentence.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    delimiter: String,
    max_chars: usize,
}

impl ContextAssembler {
    /// Create an assembler with the given block delimiter and character
    /// budget.
    pub fn new(delimiter: impl Into<String>, max_chars: usize) -> Self {
        Self { delimiter: delimiter.into(), max_chars }
    }

    /// Create an assembler from an already-validated [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.context_delimiter.clone(), config.max_context_chars)
    }

    /// Assemble the context from matches already ordered by descending
    /// score. The caller-given order is preserved.
    ///
    /// The highest-ranked match is always included, even if its block
    /// alone exceeds the budget; every further match is dropped as soon
    /// as the budget would be exceeded.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyContext`] when given zero matches. The
    /// caller decides, per its configured policy, whether to generate
    /// without context or answer that no relevant information was found.
    pub fn assemble(&self, matches: &[ScoredChunk]) -> Result<AssembledContext> {
        if matches.is_empty() {
            return Err(RagError::EmptyContext);
        }

        let delimiter_len = self.delimiter.chars().count();
        let mut text = String::new();
        let mut char_count = 0usize;
        let mut used = 0usize;

        for m in matches {
            let block = format_block(m);
            let block_len = block.chars().count();
            let added = if used == 0 { block_len } else { block_len + delimiter_len };
            if used > 0 && char_count + added > self.max_chars {
                break;
            }
            if used > 0 {
                text.push_str(&self.delimiter);
            }
            text.push_str(&block);
            char_count += added;
            used += 1;
        }

        debug!(used, dropped = matches.len() - used, char_count, "context assembled");
        Ok(AssembledContext { text, used })
    }
}

/// One context block: a source header followed by the chunk text.
fn format_block(m: &ScoredChunk) -> String {
    let source = m
        .chunk
        .metadata
        .get("filename")
        .map_or_else(|| m.chunk.document_id.as_str(), String::as_str);
    format!("--- [Document: {source}] ---\n{}", m.chunk.text)
}
