//! Embedding and generation gateways for OpenAI-compatible APIs.
//!
//! Both providers speak the OpenAI wire format over `reqwest`, so they
//! also work against compatible endpoints (Groq, Ollama, vLLM, ...) via
//! [`OpenAIEmbeddingProvider::compatible`] and
//! [`OpenAIGenerationProvider::compatible`]. Only available when the
//! `openai` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;

/// The default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// The default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

/// The default chat model for answer generation.
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Maximum tokens requested per generated answer.
const MAX_ANSWER_TOKENS: u32 = 1024;

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by an OpenAI-compatible embeddings
/// endpoint, with native batch support.
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key, using the default
    /// model (`text-embedding-3-small`, 1536 dimensions).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::compatible(api_key, OPENAI_BASE_URL)
    }

    /// Create a provider for an OpenAI-compatible API at `base_url`.
    pub fn compatible(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::EmbeddingUnavailable {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
        })
    }

    /// Create a provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| RagError::EmbeddingUnavailable {
                provider: "OpenAI".into(),
                message: "OPENAI_API_KEY environment variable not set".into(),
            })?;
        Self::new(api_key)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the output dimensions (Matryoshka truncation). Also updates
    /// the value reported by [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }
}

#[derive(Serialize)]
struct EmbeddingApiRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Extract the API's error message from a failed response body, falling
/// back to the raw body.
fn api_error_detail(body: String) -> String {
    serde_json::from_str::<ApiErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body)
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::EmbeddingUnavailable {
            provider: "OpenAI".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(batch_size = texts.len(), model = %self.model, "embedding batch");

        let body = EmbeddingApiRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        };
        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "embedding request failed");
                RagError::EmbeddingUnavailable {
                    provider: "OpenAI".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = api_error_detail(response.text().await.unwrap_or_default());
            error!(%status, "embedding API error");
            return Err(RagError::EmbeddingUnavailable {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let parsed: EmbeddingApiResponse = response.json().await.map_err(|e| {
            RagError::EmbeddingUnavailable {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Generation ─────────────────────────────────────────────────────

/// A [`GenerationProvider`] backed by an OpenAI-compatible chat
/// completions endpoint.
pub struct OpenAIGenerationProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAIGenerationProvider {
    /// Create a new provider with the given API key, using the default
    /// chat model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::compatible(api_key, OPENAI_BASE_URL, DEFAULT_CHAT_MODEL)
    }

    /// Create a provider for an OpenAI-compatible API at `base_url` with
    /// the given model name.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::GenerationUnavailable {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.into(),
            model: model.into(),
            temperature: 0.7,
        })
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatApiResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Build the user prompt for answer generation.
///
/// With context, the prompt instructs the model to ground its answer in
/// the supplied document snippets; with an empty context it falls back to
/// a general-knowledge prompt.
fn build_prompt(question: &str, context: &str) -> String {
    if context.is_empty() {
        return format!(
            "You are a helpful AI assistant. Use your general knowledge to answer the user \
             truthfully.\n\nUSER QUESTION: {question}\nANSWER:"
        );
    }

    format!(
        "You are a helpful AI assistant with access to the following document snippets.\n\n\
         DOCUMENT CONTEXT:\n{context}\n\n\
         USER QUESTION:\n{question}\n\n\
         INSTRUCTIONS:\n\
         1. Use the provided DOCUMENT CONTEXT to answer the question as accurately as possible.\n\
         2. If the context contains relevant information, mention it clearly (e.g. \"The document states...\").\n\
         3. If the context is irrelevant to the question, answer from general knowledge, but \
         always prioritize the document context when it relates to the question.\n\
         4. Do NOT say you have no access to documents when snippets are provided above.\n\n\
         ANSWER:"
    )
}

#[async_trait]
impl GenerationProvider for OpenAIGenerationProvider {
    async fn generate(&self, question: &str, context: &str) -> Result<String> {
        debug!(model = %self.model, context_chars = context.len(), "generating answer");

        let prompt = build_prompt(question, context);
        let body = ChatApiRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: "You are a helpful AI assistant." },
                ChatMessage { role: "user", content: &prompt },
            ],
            temperature: self.temperature,
            max_tokens: MAX_ANSWER_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "generation request failed");
                RagError::GenerationUnavailable {
                    provider: "OpenAI".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = api_error_detail(response.text().await.unwrap_or_default());
            error!(%status, "generation API error");
            return Err(RagError::GenerationUnavailable {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let parsed: ChatApiResponse = response.json().await.map_err(|e| {
            RagError::GenerationUnavailable {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;
        let answer = parsed.choices.into_iter().next().map(|c| c.message.content).ok_or_else(
            || RagError::GenerationUnavailable {
                provider: "OpenAI".into(),
                message: "API returned no choices".into(),
            },
        )?;
        Ok(answer.trim().to_string())
    }
}
