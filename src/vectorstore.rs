//! Vector store trait for persisting chunk embeddings and answering
//! nearest-neighbor queries.

use async_trait::async_trait;

use crate::document::{Chunk, ScoredChunk};
use crate::error::Result;

/// A storage backend for chunk embeddings with similarity search.
///
/// Implementations manage named collections of [`Chunk`]s. Writes are
/// document-scoped and atomic per document: a failed
/// [`upsert_document`](VectorStore::upsert_document) must never leave a
/// partially-indexed document discoverable by
/// [`search`](VectorStore::search). Implementations must be safe for
/// concurrent invocation.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Replace all chunks of `document_id` with `chunks`, atomically.
    ///
    /// Re-ingesting the same document id is replace, not append: chunks
    /// from an earlier ingestion that are absent from `chunks` are
    /// removed. All chunks must have embeddings set and belong to
    /// `document_id`.
    async fn upsert_document(
        &self,
        collection: &str,
        document_id: &str,
        chunks: &[Chunk],
    ) -> Result<()>;

    /// Delete every chunk owned by `document_id` from a collection.
    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<()>;

    /// Search for the `top_k` chunks most similar to the given embedding.
    ///
    /// Returns results ordered by descending similarity score, with a
    /// stable backend-native tie ordering.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>>;
}
