//! Configuration for the RAG pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// What the pipeline does when no retrieved match passes the score
/// threshold and there is no context to assemble.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmptyContextPolicy {
    /// Short-circuit generation and answer that the documents contain no
    /// relevant information.
    #[default]
    InsufficientInformation,
    /// Invoke the generation gateway with an empty context string and let
    /// it answer from general knowledge.
    ProceedWithoutContext,
}

/// Configuration parameters for chunking, retrieval, and context assembly.
///
/// Construct via [`RagConfig::builder()`] to get construction-time
/// validation; per-call code assumes a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Default number of top results to retain per query.
    pub top_k: usize,
    /// Default minimum similarity score; matches below it are discarded.
    pub score_threshold: f32,
    /// Overall character budget for the assembled context.
    pub max_context_chars: usize,
    /// Separator placed between chunk texts in the assembled context.
    pub context_delimiter: String,
    /// Behavior when no match passes the score threshold.
    pub empty_context_policy: EmptyContextPolicy,
    /// Bounded wait applied to every external gateway call.
    pub request_timeout: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            score_threshold: 0.5,
            max_context_chars: 12_000,
            context_delimiter: "\n\n".to_string(),
            empty_context_policy: EmptyContextPolicy::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a validated [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Validate that the parameters are internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `max_context_chars == 0`
    /// - `request_timeout` is zero
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidConfiguration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::InvalidConfiguration(
                "top_k must be greater than zero".to_string(),
            ));
        }
        if self.max_context_chars == 0 {
            return Err(RagError::InvalidConfiguration(
                "max_context_chars must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(RagError::InvalidConfiguration(
                "request_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the default number of top results to retain per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the default minimum similarity score for retrieved matches.
    pub fn score_threshold(mut self, threshold: f32) -> Self {
        self.config.score_threshold = threshold;
        self
    }

    /// Set the overall character budget for the assembled context.
    pub fn max_context_chars(mut self, chars: usize) -> Self {
        self.config.max_context_chars = chars;
        self
    }

    /// Set the separator placed between chunk texts in the context.
    pub fn context_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.context_delimiter = delimiter.into();
        self
    }

    /// Set the behavior when no match passes the score threshold.
    pub fn empty_context_policy(mut self, policy: EmptyContextPolicy) -> Self {
        self.config.empty_context_policy = policy;
        self
    }

    /// Set the bounded wait applied to every external gateway call.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] on the conditions listed
    /// in [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RagConfig::default().validate().is_ok());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, RagError::InvalidConfiguration(_)));

        let err = RagConfig::builder().chunk_size(100).chunk_overlap(150).build().unwrap_err();
        assert!(matches!(err, RagError::InvalidConfiguration(_)));
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let err = RagConfig::builder().chunk_size(0).chunk_overlap(0).build().unwrap_err();
        assert!(matches!(err, RagError::InvalidConfiguration(_)));
    }

    #[test]
    fn zero_top_k_rejected() {
        let err = RagConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, RagError::InvalidConfiguration(_)));
    }

    #[test]
    fn builder_sets_all_fields() {
        let config = RagConfig::builder()
            .chunk_size(500)
            .chunk_overlap(50)
            .top_k(3)
            .score_threshold(0.7)
            .max_context_chars(4000)
            .context_delimiter("\n---\n")
            .empty_context_policy(EmptyContextPolicy::ProceedWithoutContext)
            .request_timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.score_threshold, 0.7);
        assert_eq!(config.max_context_chars, 4000);
        assert_eq!(config.context_delimiter, "\n---\n");
        assert_eq!(config.empty_context_policy, EmptyContextPolicy::ProceedWithoutContext);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }
}
