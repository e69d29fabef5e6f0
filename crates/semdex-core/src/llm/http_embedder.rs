//! HTTP-based embedder using an external OpenAI-compatible service

use super::EmbeddingProvider;
use crate::config::EmbeddingServiceConfig;
use crate::db::vectors::l2_normalize;
use crate::error::{Result, SemdexError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

/// Embedder that calls `/v1/embeddings` on vLLM, TEI, OpenAI, etc.
pub struct HttpEmbedder {
    http_client: reqwest::Client,
    config: EmbeddingServiceConfig,
    dimensions: OnceLock<usize>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

/// OpenAI-style error envelope: `{"error": {"message": "..."}}`
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Human-readable message from an error response body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

impl HttpEmbedder {
    /// Create from configuration
    pub fn new(config: EmbeddingServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            config,
            dimensions: OnceLock::new(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(EmbeddingServiceConfig::default())
    }

    async fn request(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.config.model,
            input: vec![text],
        };

        let url = format!("{}/v1/embeddings", self.config.url.trim_end_matches('/'));
        let mut req = self.http_client.post(&url).json(&request);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SemdexError::Embedding(format!(
                "Embedding service error (HTTP {}): {}",
                status,
                error_message(&body)
            )));
        }

        let parsed: EmbedResponse = response.json().await?;
        let mut embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| SemdexError::Embedding("No embedding returned".to_string()))?;

        if embedding.is_empty() {
            return Err(SemdexError::Embedding("Empty embedding returned".to_string()));
        }

        l2_normalize(&mut embedding);
        Ok(embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    async fn initialize(&self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }

        // Probe once so an unreachable service fails here, not mid-index
        let probe = self
            .request("semdex readiness probe")
            .await
            .map_err(|e| SemdexError::ProviderInit(e.to_string()))?;

        if let Some(configured) = self.config.dimensions {
            if configured != probe.len() {
                return Err(SemdexError::ProviderInit(format!(
                    "{} returned {}-dimensional vectors, configured for {}",
                    self.config.model,
                    probe.len(),
                    configured
                )));
            }
        }

        let _ = self.dimensions.set(probe.len());
        tracing::info!(
            "Embedding provider ready: {} ({} dimensions)",
            self.config.model,
            probe.len()
        );
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.dimensions.get().is_some()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if !self.is_ready() {
            return Err(SemdexError::NotInitialized);
        }
        self.request(text).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
            .get()
            .copied()
            .or(self.config.dimensions)
            .unwrap_or(0)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
