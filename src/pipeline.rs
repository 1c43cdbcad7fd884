//! Pipeline orchestration: ingestion and query sequencing with per-phase
//! timing.
//!
//! The [`RagPipeline`] composes an [`EmbeddingProvider`], a
//! [`VectorStore`], and a [`GenerationProvider`] with the crate's own
//! [`Segmenter`], [`Retriever`], and [`ContextAssembler`]. Each query runs
//! strictly embed → retrieve → assemble → generate; each ingestion runs
//! segment → batch-embed → upsert. Every external call is bounded by the
//! configured request timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragcore::{RagPipeline, RagConfig, InMemoryVectorStore, Document, QueryRequest};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .generation_provider(Arc::new(generator))
//!     .build()?;
//!
//! pipeline.create_collection("docs").await?;
//! pipeline.ingest("docs", &document).await?;
//! let result = pipeline.query("docs", &QueryRequest::new("What is covered?")).await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::chunking::Segmenter;
use crate::config::{EmptyContextPolicy, RagConfig};
use crate::context::ContextAssembler;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;
use crate::query::{IngestReport, QueryMetadata, QueryRequest, QueryResult, SourceRef};
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// Answer returned when no match passes the threshold and the policy is
/// [`EmptyContextPolicy::InsufficientInformation`].
const NO_CONTEXT_ANSWER: &str =
    "I could not find relevant information in the uploaded documents to answer that question.";

/// The RAG pipeline orchestrator.
///
/// Holds only `Arc`s and owned configuration, and every operation takes
/// `&self`, so one pipeline can serve many concurrent requests; awaiting
/// a slow gateway never stalls unrelated tasks. Dropping an in-flight
/// query discards its work without observable partial results.
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    generation_provider: Arc<dyn GenerationProvider>,
    segmenter: Segmenter,
    retriever: Retriever,
    assembler: ContextAssembler,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Create a named collection in the vector store, sized to the
    /// embedding gateway's dimensionality.
    pub async fn create_collection(&self, name: &str) -> Result<()> {
        let dimensions = self.embedding_provider.dimensions();
        self.vector_store.create_collection(name, dimensions).await
    }

    /// Delete a named collection and all its data.
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        self.vector_store.delete_collection(name).await
    }

    /// Delete a document and all its chunks from a collection.
    ///
    /// After this returns, no query against the collection can surface
    /// the document's chunks.
    pub async fn delete_document(&self, collection: &str, document_id: &str) -> Result<()> {
        self.vector_store.delete_document(collection, document_id).await?;
        info!(collection, document_id, "deleted document");
        Ok(())
    }

    /// Ingest a document: segment → batch-embed → upsert.
    ///
    /// All chunk texts go to the embedding gateway in one batch call, and
    /// all (vector, chunk) pairs reach the store in one document-scoped
    /// upsert, so re-ingesting the same document id replaces its chunks
    /// and a failed ingestion leaves nothing discoverable. Documents that
    /// segment to zero chunks skip both gateway calls.
    pub async fn ingest(&self, collection: &str, document: &Document) -> Result<IngestReport> {
        let started = Instant::now();

        let mut chunks = self.segmenter.segment(document);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested empty document");
            return Ok(IngestReport {
                document_id: document.id.clone(),
                chunk_count: 0,
                processing_time_ms: elapsed_ms(started),
            });
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self
            .bounded(self.embedding_provider.embed_batch(&texts), || RagError::EmbeddingUnavailable {
                provider: "timeout".to_string(),
                message: timeout_message(&self.config),
            })
            .await?;
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.bounded(
            self.vector_store.upsert_document(collection, &document.id, &chunks),
            || RagError::VectorStore {
                backend: "timeout".to_string(),
                message: timeout_message(&self.config),
            },
        )
        .await?;

        let report = IngestReport {
            document_id: document.id.clone(),
            chunk_count: chunks.len(),
            processing_time_ms: elapsed_ms(started),
        };
        info!(
            document.id = %report.document_id,
            chunk_count = report.chunk_count,
            processing_time_ms = report.processing_time_ms,
            "ingested document"
        );
        Ok(report)
    }

    /// Answer a question: embed → retrieve → assemble → generate.
    ///
    /// Phases run strictly in order; a failure in any phase terminates
    /// the query with an error that reports the phase (see
    /// [`RagError::phase`]). When no match passes the threshold, the
    /// configured [`EmptyContextPolicy`] decides between a fixed
    /// insufficient-information answer and context-free generation.
    pub async fn query(&self, collection: &str, request: &QueryRequest) -> Result<QueryResult> {
        if request.question.trim().is_empty() {
            return Err(RagError::InvalidRequest("question must not be empty".to_string()));
        }
        let top_k = request.top_k.unwrap_or(self.config.top_k);
        let score_threshold = request.score_threshold.unwrap_or(self.config.score_threshold);
        if top_k == 0 {
            return Err(RagError::InvalidRequest("top_k must be greater than zero".to_string()));
        }

        let started = Instant::now();

        // Embed the question in a single gateway call.
        let embed_started = Instant::now();
        let query_vector = self
            .bounded(self.embedding_provider.embed(&request.question), || {
                RagError::EmbeddingUnavailable {
                    provider: "timeout".to_string(),
                    message: timeout_message(&self.config),
                }
            })
            .await?;
        let embedding_time_ms = elapsed_ms(embed_started);

        // Retrieve ranked matches, filter-then-truncate.
        let retrieval_started = Instant::now();
        let matches = self
            .bounded(
                self.retriever.retrieve(collection, &query_vector, top_k, score_threshold),
                || RagError::RetrievalUnavailable(timeout_message(&self.config)),
            )
            .await?;
        let retrieval_time_ms = elapsed_ms(retrieval_started);

        match matches.first() {
            Some(top) => {
                info!(match_count = matches.len(), top_score = top.score, "retrieval complete")
            }
            None => warn!(score_threshold, "no matches passed the score threshold"),
        }

        // Assemble the context; the empty-context policy decides what an
        // empty match set means.
        let (context, used) = match self.assembler.assemble(&matches) {
            Ok(assembled) => (assembled.text, assembled.used),
            Err(RagError::EmptyContext) => match self.config.empty_context_policy {
                EmptyContextPolicy::InsufficientInformation => {
                    info!("empty context, answering without generation");
                    return Ok(QueryResult {
                        answer: NO_CONTEXT_ANSWER.to_string(),
                        sources: Vec::new(),
                        metadata: QueryMetadata {
                            embedding_time_ms,
                            retrieval_time_ms,
                            generation_time_ms: 0.0,
                            total_time_ms: elapsed_ms(started),
                            chunks_retrieved: 0,
                        },
                    });
                }
                EmptyContextPolicy::ProceedWithoutContext => (String::new(), 0),
            },
            Err(e) => return Err(e),
        };

        // Generate the answer.
        let generation_started = Instant::now();
        let answer = self
            .bounded(self.generation_provider.generate(&request.question, &context), || {
                RagError::GenerationUnavailable {
                    provider: "timeout".to_string(),
                    message: timeout_message(&self.config),
                }
            })
            .await?;
        let generation_time_ms = elapsed_ms(generation_started);

        let sources: Vec<SourceRef> = matches[..used].iter().map(SourceRef::from).collect();
        let result = QueryResult {
            answer,
            sources,
            metadata: QueryMetadata {
                embedding_time_ms,
                retrieval_time_ms,
                generation_time_ms,
                total_time_ms: elapsed_ms(started),
                chunks_retrieved: matches.len(),
            },
        };
        info!(
            chunks_retrieved = result.metadata.chunks_retrieved,
            sources = result.sources.len(),
            total_time_ms = result.metadata.total_time_ms,
            "query complete"
        );
        Ok(result)
    }

    /// Await `fut` for at most the configured request timeout.
    async fn bounded<T, F>(&self, fut: F, on_timeout: impl FnOnce() -> RagError) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.config.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout()),
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    let ms = started.elapsed().as_secs_f64() * 1000.0;
    (ms * 100.0).round() / 100.0
}

fn timeout_message(config: &RagConfig) -> String {
    format!("call exceeded the {:?} request timeout", config.request_timeout)
}

/// Builder for constructing a [`RagPipeline`].
///
/// The configuration defaults to [`RagConfig::default()`]; the three
/// gateway providers are required. [`build()`](RagPipelineBuilder::build)
/// validates the configuration once, so per-request code never re-checks
/// it.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding gateway.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the generation gateway.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Build the [`RagPipeline`], validating configuration and required
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if a required provider
    /// is missing or the configuration fails validation.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            RagError::InvalidConfiguration("embedding_provider is required".to_string())
        })?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::InvalidConfiguration("vector_store is required".to_string()))?;
        let generation_provider = self.generation_provider.ok_or_else(|| {
            RagError::InvalidConfiguration("generation_provider is required".to_string())
        })?;

        let segmenter = Segmenter::from_config(&config)?;
        let retriever = Retriever::new(Arc::clone(&vector_store));
        let assembler = ContextAssembler::from_config(&config);

        Ok(RagPipeline {
            config,
            embedding_provider,
            vector_store,
            generation_provider,
            segmenter,
            retriever,
            assembler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_all_providers() {
        let err = RagPipeline::builder().build().unwrap_err();
        assert!(matches!(err, RagError::InvalidConfiguration(_)));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let config =
            RagConfig { chunk_size: 10, chunk_overlap: 10, ..RagConfig::default() };
        let err = RagPipeline::builder().config(config).build().unwrap_err();
        assert!(matches!(err, RagError::InvalidConfiguration(_)));
    }
}
