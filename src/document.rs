//! Data types for documents, chunks, and retrieved matches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing extracted text content and metadata.
///
/// Text extraction from the original format (PDF, plain text, ...) happens
/// upstream; a `Document` always carries plain text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The extracted text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document (e.g. `filename`).
    pub metadata: HashMap<String, String>,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl Document {
    /// Create a document from an id and text, with empty metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: HashMap::new(), source_uri: None }
    }

    /// Add a metadata entry, consuming and returning the document.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A bounded contiguous segment of a [`Document`], the unit of embedding
/// and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, `{document_id}_{sequence_index}`.
    pub id: String,
    /// The trimmed text content of the chunk.
    pub text: String,
    /// Position within the source document, 0-based and strictly increasing.
    pub sequence_index: usize,
    /// The ID of the owning [`Document`].
    pub document_id: String,
    /// Metadata inherited from the document plus chunk-specific fields
    /// (`chunk_index`, `total_chunks`, char offsets).
    pub metadata: HashMap<String, String>,
    /// The vector embedding for this chunk's text. Empty until the
    /// pipeline attaches one.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] paired with a similarity score.
///
/// Produced fresh per query and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
