//! Embedding gateway trait for converting text into vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A gateway that converts text into fixed-length embedding vectors.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface and must be safe for concurrent invocation. Embeddings are
/// deterministic for identical input.
///
/// Ingestion always embeds a whole chunk batch through one
/// [`embed_batch`](EmbeddingProvider::embed_batch) call; the default
/// sequential implementation exists only for backends with no native
/// batching.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, in order.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input. Backends with native batch support
    /// should override it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The dimensionality of embeddings produced by this gateway.
    fn dimensions(&self) -> usize;
}
