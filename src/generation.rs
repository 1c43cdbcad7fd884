//! Generation gateway trait for producing answers from question and context.

use async_trait::async_trait;

use crate::error::Result;

/// A gateway that produces an answer given a question and an assembled
/// context string.
///
/// The context may be empty when the pipeline's empty-context policy is
/// [`ProceedWithoutContext`](crate::config::EmptyContextPolicy::ProceedWithoutContext);
/// implementations should then answer from general knowledge. Beyond its
/// latency, the backing model is a black box to this crate.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate an answer for `question` using `context` as supporting
    /// document material.
    async fn generate(&self, question: &str, context: &str) -> Result<String>;
}
