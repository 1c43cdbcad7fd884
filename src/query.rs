//! Boundary types for queries and ingestion reports.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::document::ScoredChunk;

/// Maximum chunk text length echoed back in a [`SourceRef`].
const SOURCE_TEXT_LIMIT: usize = 500;

/// A natural-language question with optional per-request retrieval
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    /// The user's question. Must be non-empty.
    pub question: String,
    /// Maximum number of ranked matches to retain. Falls back to the
    /// configured default when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    /// Minimum similarity score for a match. Falls back to the configured
    /// default when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f32>,
}

impl QueryRequest {
    /// Create a request using the pipeline's configured defaults.
    pub fn new(question: impl Into<String>) -> Self {
        Self { question: question.into(), top_k: None, score_threshold: None }
    }

    /// Override the number of matches to retain for this request.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Override the score threshold for this request.
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }
}

/// A chunk that backed the generated answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    /// The chunk text, truncated to 500 characters for the response.
    pub chunk_text: String,
    /// The owning document's id.
    pub document_id: String,
    /// The similarity score of the match.
    pub similarity_score: f32,
    /// Chunk metadata (filename, chunk index, offsets).
    pub metadata: HashMap<String, String>,
}

impl From<&ScoredChunk> for SourceRef {
    fn from(m: &ScoredChunk) -> Self {
        let text = &m.chunk.text;
        let chunk_text = if text.chars().count() > SOURCE_TEXT_LIMIT {
            let mut truncated: String = text.chars().take(SOURCE_TEXT_LIMIT).collect();
            truncated.push_str("...");
            truncated
        } else {
            text.clone()
        };
        Self {
            chunk_text,
            document_id: m.chunk.document_id.clone(),
            similarity_score: m.score,
            metadata: m.chunk.metadata.clone(),
        }
    }
}

/// Per-phase wall-clock measurements for one query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryMetadata {
    /// Time spent embedding the question, in milliseconds.
    pub embedding_time_ms: f64,
    /// Time spent in similarity search and filtering, in milliseconds.
    pub retrieval_time_ms: f64,
    /// Time spent in answer generation, in milliseconds. Zero when
    /// generation was short-circuited by the empty-context policy.
    pub generation_time_ms: f64,
    /// Total wall-clock time for the query, in milliseconds.
    pub total_time_ms: f64,
    /// Number of matches that passed the score threshold.
    pub chunks_retrieved: usize,
}

/// The outcome of one query: the answer, the sources actually used as
/// context (descending by score), and timing metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// The generated answer text.
    pub answer: String,
    /// The matches whose text was included in the context.
    pub sources: Vec<SourceRef>,
    /// Per-phase timing and retrieval counters.
    pub metadata: QueryMetadata,
}

/// The outcome of ingesting one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestReport {
    /// The id of the ingested document.
    pub document_id: String,
    /// Number of chunks embedded and indexed.
    pub chunk_count: usize,
    /// Total wall-clock processing time, in milliseconds.
    pub processing_time_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chunk;

    #[test]
    fn long_chunk_text_is_truncated_in_source_ref() {
        let m = ScoredChunk {
            chunk: Chunk {
                id: "d1_0".to_string(),
                text: "x".repeat(600),
                sequence_index: 0,
                document_id: "d1".to_string(),
                metadata: HashMap::new(),
                embedding: Vec::new(),
            },
            score: 0.9,
        };
        let source = SourceRef::from(&m);
        assert_eq!(source.chunk_text.chars().count(), 503);
        assert!(source.chunk_text.ends_with("..."));
    }

    #[test]
    fn short_chunk_text_is_kept_verbatim() {
        let m = ScoredChunk {
            chunk: Chunk {
                id: "d1_0".to_string(),
                text: "short".to_string(),
                sequence_index: 0,
                document_id: "d1".to_string(),
                metadata: HashMap::new(),
                embedding: Vec::new(),
            },
            score: 0.9,
        };
        assert_eq!(SourceRef::from(&m).chunk_text, "short");
    }

    #[test]
    fn query_result_serializes_to_the_boundary_shape() {
        let result = QueryResult {
            answer: "42".to_string(),
            sources: Vec::new(),
            metadata: QueryMetadata {
                embedding_time_ms: 1.0,
                retrieval_time_ms: 2.0,
                generation_time_ms: 3.0,
                total_time_ms: 6.5,
                chunks_retrieved: 0,
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["answer"], "42");
        assert_eq!(json["metadata"]["retrieval_time_ms"], 2.0);
        assert_eq!(json["metadata"]["chunks_retrieved"], 0);
    }
}
