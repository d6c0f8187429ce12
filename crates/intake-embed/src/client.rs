//! HTTP embedding client.
//!
//! Talks to any **OpenAI-compatible embeddings API** (`POST /embeddings`),
//! which covers OpenAI itself as well as local servers such as Ollama, vLLM
//! and LM Studio.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use crate::error::{EmbedError, Result};
use crate::traits::{Embedder, Embedding};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default base URL: Ollama's OpenAI-compatible endpoint on localhost.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "nomic-embed-text";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Configuration for connecting to an embeddings endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingClientConfig {
    /// Base URL of the API, without the trailing `/embeddings`.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Optional bearer token.  Local servers usually need none.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for EmbeddingClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl EmbeddingClientConfig {
    /// Create a configuration for an OpenAI-compatible endpoint.
    pub fn openai_compatible(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Attach a bearer token.  Empty keys are ignored.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// An [`Embedder`] backed by an OpenAI-compatible HTTP endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    config: EmbeddingClientConfig,
    http: reqwest::Client,
}

impl EmbeddingClient {
    /// Create a new client with the given configuration.
    pub fn new(config: EmbeddingClientConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(EmbedError::Config {
                reason: "base_url must not be empty".into(),
            });
        }
        if config.model.trim().is_empty() {
            return Err(EmbedError::Config {
                reason: "model must not be empty".into(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbedError::Config {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { config, http })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &EmbeddingClientConfig {
        &self.config
    }

    /// Send one embeddings request for `texts` and return vectors in input
    /// order.
    async fn request(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            let auth_value = format!("Bearer {key}");
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value).map_err(|e| EmbedError::Config {
                    reason: format!("invalid authorization header: {e}"),
                })?,
            );
        }

        let body = json!({
            "model": self.config.model,
            "input": texts,
        });

        tracing::debug!(url = %url, model = %self.config.model, count = texts.len(), "sending embeddings request");

        let resp = self.http.post(&url).headers(headers).json(&body).send().await?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| EmbedError::RequestFailed {
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(EmbedError::RequestFailed {
                reason: format!("API returned {status}: {text}"),
            });
        }

        parse_embeddings_response(&text, texts)
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut vectors = self.request(&[text.to_owned()]).await?;
        vectors.pop().ok_or_else(|| EmbedError::ParseFailed {
            reason: "response contained no embeddings".into(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }
}

/// Parse an OpenAI-style embeddings body into vectors ordered like `inputs`.
///
/// Entries are sorted by their `index` field, the count must match the
/// number of inputs, and no vector may be empty.
pub fn parse_embeddings_response(body: &str, inputs: &[String]) -> Result<Vec<Embedding>> {
    let parsed: EmbeddingsResponse = serde_json::from_str(body)?;

    let mut data = parsed.data;
    if data.len() != inputs.len() {
        return Err(EmbedError::ParseFailed {
            reason: format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                data.len()
            ),
        });
    }
    data.sort_by_key(|d| d.index);

    data.into_iter()
        .zip(inputs)
        .map(|(datum, text)| {
            if datum.embedding.is_empty() {
                Err(EmbedError::EmptyEmbedding { text: text.clone() })
            } else {
                Ok(datum.embedding)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
