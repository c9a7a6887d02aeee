//! HTTP adapter for an OpenAI-compatible embeddings endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{EngineError, EngineResult};

use super::EmbeddingProvider;

/// Configuration for the HTTP embedding provider
#[derive(Debug, Clone)]
pub struct HttpEmbeddingProviderConfig {
    /// Base URL of the embeddings API
    pub base_url: String,
    /// Bearer token sent with every request
    pub api_key: String,
    /// Timeout in seconds for HTTP requests
    pub timeout_secs: u64,
}

impl Default for HttpEmbeddingProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Client for an OpenAI-compatible `POST /embeddings` endpoint
#[derive(Debug, Clone)]
pub struct HttpEmbeddingProvider {
    config: HttpEmbeddingProviderConfig,
    client: Client,
}

/// Request payload for the embeddings endpoint
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: u32,
    encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl HttpEmbeddingProvider {
    /// Creates a provider with the given configuration.
    pub fn new(config: HttpEmbeddingProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Creates a provider with the given URL and key and default timeout.
    pub fn with_url_and_key(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::new(HttpEmbeddingProviderConfig {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..HttpEmbeddingProviderConfig::default()
        })
    }

    /// Maps a transport error to an EngineError
    fn map_http_error(&self, error: reqwest::Error) -> EngineError {
        if error.is_timeout() {
            EngineError::Timeout(format!("Embedding request timed out: {}", error))
        } else if error.is_connect() {
            EngineError::Provider(format!("Connection error: {}", error))
        } else {
            EngineError::Provider(format!("HTTP error: {}", error))
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn embed(&self, text: &str, model: &str, dimensions: u32) -> EngineResult<Vec<f32>> {
        debug!("Requesting embedding");

        let url = format!("{}/embeddings", self.config.base_url);
        let request = EmbeddingRequest {
            model,
            input: text,
            dimensions,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_http_error(e))?;

        match response.status() {
            StatusCode::OK => {
                let body: EmbeddingResponse = response.json().await.map_err(|e| {
                    EngineError::provider(format!("Failed to parse response: {}", e))
                })?;

                let embedding = body
                    .data
                    .into_iter()
                    .next()
                    .map(|d| d.embedding)
                    .ok_or_else(|| EngineError::provider("Response contained no embeddings"))?;

                if embedding.len() != dimensions as usize {
                    return Err(EngineError::provider(format!(
                        "Expected {} dimensions, got {}",
                        dimensions,
                        embedding.len()
                    )));
                }

                Ok(embedding)
            }
            status => {
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP error: {}", status));
                Err(EngineError::provider(error_body))
            }
        }
    }
}
