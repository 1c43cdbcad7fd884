//! Error types for the `ragcore` crate.

use thiserror::Error;

/// The phase of the query pipeline in which a failure occurred.
///
/// A query moves strictly through embedding, retrieval, assembly, and
/// generation; a failure in any phase terminates the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    /// Converting the question into a query vector.
    Embedding,
    /// Nearest-neighbor search against the vector store.
    Retrieval,
    /// Concatenating retrieved chunks into a prompt context.
    Assembly,
    /// Producing the final answer from question and context.
    Generation,
}

impl std::fmt::Display for QueryPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QueryPhase::Embedding => "embedding",
            QueryPhase::Retrieval => "retrieval",
            QueryPhase::Assembly => "assembly",
            QueryPhase::Generation => "generation",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in chunking, retrieval, and pipeline operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid chunking or retrieval configuration. Fatal at setup, never
    /// recoverable per request.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A request that violates the data model (e.g. an empty question).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The embedding gateway failed or timed out.
    #[error("Embedding unavailable ({provider}): {message}")]
    EmbeddingUnavailable {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector index was unreachable or timed out. Surfaced to the
    /// caller as a failed query; never retried here.
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// No matches passed the score threshold, so there is no context to
    /// assemble. Handled per the configured [`EmptyContextPolicy`].
    ///
    /// [`EmptyContextPolicy`]: crate::config::EmptyContextPolicy
    #[error("No context: no retrieved matches passed the score threshold")]
    EmptyContext,

    /// The generation gateway failed or timed out. Surfaced, not retried.
    #[error("Generation unavailable ({provider}): {message}")]
    GenerationUnavailable {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A backend-level vector store failure.
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },
}

impl RagError {
    /// The query phase this error corresponds to, if it can occur
    /// mid-pipeline. Configuration and request errors return `None`.
    pub fn phase(&self) -> Option<QueryPhase> {
        match self {
            RagError::EmbeddingUnavailable { .. } => Some(QueryPhase::Embedding),
            RagError::RetrievalUnavailable(_) | RagError::VectorStore { .. } => {
                Some(QueryPhase::Retrieval)
            }
            RagError::EmptyContext => Some(QueryPhase::Assembly),
            RagError::GenerationUnavailable { .. } => Some(QueryPhase::Generation),
            RagError::InvalidConfiguration(_) | RagError::InvalidRequest(_) => None,
        }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
