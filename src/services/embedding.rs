//! Embedding client for generating text embeddings.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::EmbeddingError;
use crate::models::EmbeddingConfig;

/// Text-in, vector-out capability.
///
/// The output is parallel to the input: same length, same order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Request body for the /embed endpoint.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

/// Response from the /embed endpoint.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Health response from the /healthz endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// HTTP client for the embedding service.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    client: Client,
    base_url: String,
    max_batch_size: usize,
}

impl EmbeddingClient {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            max_batch_size: config.max_batch_size.max(1),
        })
    }

    pub fn with_defaults() -> Result<Self, EmbeddingError> {
        Self::new(&EmbeddingConfig::default())
    }

    /// Check that the embedding service answers and report its model.
    pub async fn health_check(&self) -> Result<HealthResponse, EmbeddingError> {
        let url = format!("{}/healthz", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(EmbeddingError::Unavailable(format!(
                "health check failed with status: {}",
                response.status()
            )));
        }

        // Older deployments answer with an empty body
        let body = response.bytes().await.map_err(transport_error)?;
        if body.is_empty() {
            return Ok(HealthResponse::default());
        }
        serde_json::from_slice(&body).map_err(|e| EmbeddingError::Protocol(e.to_string()))
    }

    async fn embed_single_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let url = format!("{}/embed", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest { texts })
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Unavailable(format!(
                "status {}: {}",
                status, body
            )));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let decoded: EmbedResponse =
            serde_json::from_slice(&body).map_err(|e| EmbeddingError::Protocol(e.to_string()))?;

        if decoded.embeddings.len() != texts.len() {
            return Err(EmbeddingError::Protocol(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                decoded.embeddings.len()
            )));
        }

        Ok(decoded.embeddings)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        // The service is not defined on empty input
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.max_batch_size) {
            let embeddings = self.embed_single_batch(chunk).await?;
            all_embeddings.extend(embeddings);
        }

        tracing::debug!(texts = texts.len(), "embedded batch");
        Ok(all_embeddings)
    }
}

fn transport_error(e: reqwest::Error) -> EmbeddingError {
    if e.is_timeout() {
        EmbeddingError::Unavailable(format!("request timed out: {}", e))
    } else if e.is_connect() {
        EmbeddingError::Unavailable(format!("connect error: {}", e))
    } else {
        EmbeddingError::Unavailable(e.to_string())
    }
}
