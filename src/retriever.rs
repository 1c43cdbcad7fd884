//! Score-filtered nearest-neighbor retrieval.

use std::sync::Arc;

use tracing::debug;

use crate::document::ScoredChunk;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Retrieves ranked chunks for a query vector, applying score-threshold
/// filtering and top-k truncation. Read-only against the store.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    /// Create a retriever backed by the given vector store.
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Retrieve up to `top_k` matches with `score >= score_threshold`,
    /// ordered by descending similarity.
    ///
    /// Filtering happens before truncation: if the store's ordering
    /// degrades, a passing candidate beyond position `top_k` must not be
    /// discarded in favor of a failing one before it. Ties keep the
    /// store's native ordering.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RetrievalUnavailable`] if the store call
    /// fails. The failure is surfaced to the orchestrator, not retried.
    pub async fn retrieve(
        &self,
        collection: &str,
        query_vector: &[f32],
        top_k: usize,
        score_threshold: f32,
    ) -> Result<Vec<ScoredChunk>> {
        let candidates =
            self.store.search(collection, query_vector, top_k).await.map_err(|e| {
                RagError::RetrievalUnavailable(format!(
                    "search failed in collection '{collection}': {e}"
                ))
            })?;

        let candidate_count = candidates.len();
        let mut matches: Vec<ScoredChunk> =
            candidates.into_iter().filter(|m| m.score >= score_threshold).collect();
        matches.truncate(top_k);

        debug!(
            collection,
            candidate_count,
            match_count = matches.len(),
            score_threshold,
            "retrieval complete"
        );
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::document::Chunk;

    /// A store stub returning a fixed candidate list, in the exact order
    /// it was given.
    struct FixedStore {
        results: Vec<ScoredChunk>,
        fail: bool,
    }

    #[async_trait]
    impl VectorStore for FixedStore {
        async fn create_collection(&self, _name: &str, _dimensions: usize) -> Result<()> {
            Ok(())
        }

        async fn delete_collection(&self, _name: &str) -> Result<()> {
            Ok(())
        }

        async fn upsert_document(
            &self,
            _collection: &str,
            _document_id: &str,
            _chunks: &[Chunk],
        ) -> Result<()> {
            Ok(())
        }

        async fn delete_document(&self, _collection: &str, _document_id: &str) -> Result<()> {
            Ok(())
        }

        async fn search(
            &self,
            _collection: &str,
            _embedding: &[f32],
            _top_k: usize,
        ) -> Result<Vec<ScoredChunk>> {
            if self.fail {
                return Err(RagError::VectorStore {
                    backend: "Fixed".to_string(),
                    message: "index unreachable".to_string(),
                });
            }
            // Hands back every candidate, in whatever order it was
            // seeded with, to exercise the filter-then-truncate path.
            Ok(self.results.clone())
        }
    }

    fn scored(id: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id: id.to_string(),
                text: format!("text {id}"),
                sequence_index: 0,
                document_id: "d1".to_string(),
                metadata: HashMap::new(),
                embedding: Vec::new(),
            },
            score,
        }
    }

    fn retriever(results: Vec<ScoredChunk>) -> Retriever {
        Retriever::new(Arc::new(FixedStore { results, fail: false }))
    }

    #[tokio::test]
    async fn filters_below_threshold_and_truncates_to_top_k() {
        let r = retriever(vec![
            scored("a", 0.95),
            scored("b", 0.85),
            scored("c", 0.75),
            scored("d", 0.45),
        ]);
        let matches = r.retrieve("docs", &[1.0], 4, 0.5).await.unwrap();
        assert_eq!(matches.len(), 3);
        assert!(matches.iter().all(|m| m.score >= 0.5));
    }

    #[tokio::test]
    async fn filter_happens_before_truncation() {
        // Degraded store ordering: a failing candidate sits ahead of
        // passing ones. Truncate-first would keep only one passing match.
        let r = retriever(vec![scored("a", 0.4), scored("b", 0.9), scored("c", 0.8)]);
        let matches = r.retrieve("docs", &[1.0], 2, 0.5).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].chunk.id, "b");
        assert_eq!(matches[1].chunk.id, "c");
    }

    #[tokio::test]
    async fn all_below_threshold_yields_empty() {
        let r = retriever(vec![scored("a", 0.8), scored("b", 0.7)]);
        let matches = r.retrieve("docs", &[1.0], 5, 0.9).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn store_failure_maps_to_retrieval_unavailable() {
        let r = Retriever::new(Arc::new(FixedStore { results: Vec::new(), fail: true }));
        let err = r.retrieve("docs", &[1.0], 5, 0.5).await.unwrap_err();
        assert!(matches!(err, RagError::RetrievalUnavailable(_)));
    }
}
