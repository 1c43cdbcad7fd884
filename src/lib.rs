//! # ragcore
//!
//! Retrieval-augmented question answering over uploaded documents.
//!
//! This crate implements the two non-trivial parts of a document Q&A
//! system, and only those: splitting raw text into overlapping,
//! boundary-aware chunks, and orchestrating the embed → retrieve →
//! assemble → generate pipeline with score filtering and per-phase
//! timing. Transport, file parsing, model hosting, and vector
//! persistence stay behind trait seams.
//!
//! ## Components
//!
//! - [`Segmenter`] — boundary-aware chunking with configurable overlap
//! - [`EmbeddingProvider`] / [`GenerationProvider`] — gateway traits for
//!   the embedding and answer models
//! - [`VectorStore`] — similarity index trait, with
//!   [`InMemoryVectorStore`] as the built-in cosine-similarity backend
//! - [`Retriever`] — score-threshold filtering and top-k truncation
//! - [`ContextAssembler`] — budgeted prompt-context concatenation
//! - [`RagPipeline`] — the orchestrator tying it all together
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragcore::{Document, InMemoryVectorStore, QueryRequest, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::builder().chunk_size(1000).chunk_overlap(200).build()?)
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .generation_provider(Arc::new(generator))
//!     .build()?;
//!
//! pipeline.create_collection("docs").await?;
//! pipeline.ingest("docs", &Document::new("doc_1", text)).await?;
//! let result = pipeline.query("docs", &QueryRequest::new("What does it say?")).await?;
//! println!("{} ({} sources)", result.answer, result.sources.len());
//! ```

pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod query;
pub mod retriever;
pub mod vectorstore;

pub use chunking::Segmenter;
pub use config::{EmptyContextPolicy, RagConfig, RagConfigBuilder};
pub use context::{AssembledContext, ContextAssembler};
pub use document::{Chunk, Document, ScoredChunk};
pub use embedding::EmbeddingProvider;
pub use error::{QueryPhase, RagError, Result};
pub use generation::GenerationProvider;
pub use inmemory::InMemoryVectorStore;
#[cfg(feature = "openai")]
pub use openai::{OpenAIEmbeddingProvider, OpenAIGenerationProvider};
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use query::{IngestReport, QueryMetadata, QueryRequest, QueryResult, SourceRef};
pub use retriever::Retriever;
pub use vectorstore::VectorStore;
