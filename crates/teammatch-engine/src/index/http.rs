//! HTTP adapter for a remote vector index service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::{EngineError, EngineResult};

use super::{IndexDoc, SearchHit, VectorIndex};

/// Configuration for the HTTP vector index client
#[derive(Debug, Clone)]
pub struct HttpVectorIndexConfig {
    /// Base URL of the index service
    pub endpoint: String,
    /// API key sent as `x-api-key`; absent sends no auth header
    pub api_key: Option<String>,
    /// Dimensionality used when creating collections
    pub dimensions: u32,
    /// Timeout in seconds for HTTP requests
    pub timeout_secs: u64,
}

impl Default for HttpVectorIndexConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8091".to_string(),
            api_key: None,
            dimensions: 1024,
            timeout_secs: 30,
        }
    }
}

/// Client for a remote vector index exposing collection create, document
/// upsert, and nearest-neighbor query endpoints.
///
/// Clones share the set of collections known to exist, so each collection
/// is created at most once per client graph.
#[derive(Debug, Clone)]
pub struct HttpVectorIndex {
    config: HttpVectorIndexConfig,
    client: Client,
    ensured: Arc<Mutex<HashSet<String>>>,
}

/// Request payload for collection creation
#[derive(Debug, Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    dimension: u32,
    metric: &'a str,
}

/// Request payload for document upsert
#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    docs: &'a [IndexDoc],
}

/// Request payload for nearest-neighbor query
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
}

/// API response wrapper
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    status: String,
    data: Option<T>,
    error: Option<String>,
}

impl HttpVectorIndex {
    /// Creates a client with the given configuration.
    pub fn new(config: HttpVectorIndexConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            ensured: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(url);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header("x-api-key", api_key);
        }
        builder
    }

    /// Maps a transport error to an EngineError
    fn map_http_error(&self, error: reqwest::Error) -> EngineError {
        if error.is_timeout() {
            EngineError::Timeout(format!("Index request timed out: {}", error))
        } else if error.is_connect() {
            EngineError::Index(format!("Connection error: {}", error))
        } else {
            EngineError::Index(format!("HTTP error: {}", error))
        }
    }

    /// Creates `collection` unless this client graph already has.
    async fn ensure_collection(&self, collection: &str) -> EngineResult<()> {
        {
            let ensured = self.ensured.lock().await;
            if ensured.contains(collection) {
                return Ok(());
            }
        }

        debug!(collection = %collection, "Ensuring collection exists");

        let url = format!("{}/collections", self.config.endpoint);
        let request = CreateCollectionRequest {
            name: collection,
            dimension: self.config.dimensions,
            metric: "cosine",
        };

        let response = self
            .request(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_http_error(e))?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let api_response: ApiResponse<serde_json::Value> =
                    response.json().await.map_err(|e| {
                        EngineError::index(format!("Failed to parse response: {}", e))
                    })?;

                match api_response.status.as_str() {
                    "success" | "already_exists" => {}
                    _ => {
                        let error_msg = api_response
                            .error
                            .unwrap_or_else(|| "Unknown error".to_string());
                        return Err(EngineError::index(error_msg));
                    }
                }
            }
            // Collection already existing is the goal state.
            StatusCode::CONFLICT => {}
            status => {
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP error: {}", status));
                return Err(EngineError::index(error_body));
            }
        }

        self.ensured.lock().await.insert(collection.to_string());
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    #[instrument(skip(self, docs), fields(doc_count = docs.len()))]
    async fn upsert(&self, collection: &str, docs: Vec<IndexDoc>) -> EngineResult<()> {
        if docs.is_empty() {
            return Ok(());
        }

        self.ensure_collection(collection).await?;

        let url = format!("{}/collections/{}/docs", self.config.endpoint, collection);
        let request = UpsertRequest { docs: &docs };

        let response = self
            .request(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_http_error(e))?;

        match response.status() {
            StatusCode::OK => {
                let api_response: ApiResponse<serde_json::Value> =
                    response.json().await.map_err(|e| {
                        EngineError::index(format!("Failed to parse response: {}", e))
                    })?;

                match api_response.status.as_str() {
                    "success" => Ok(()),
                    _ => {
                        let error_msg = api_response
                            .error
                            .unwrap_or_else(|| "Unknown error".to_string());
                        Err(EngineError::index(error_msg))
                    }
                }
            }
            status => {
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP error: {}", status));
                Err(EngineError::index(error_body))
            }
        }
    }

    #[instrument(skip(self, vector), fields(top_k = top_k))]
    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> EngineResult<Vec<SearchHit>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/collections/{}/query", self.config.endpoint, collection);
        let request = QueryRequest { vector, top_k };

        let response = self
            .request(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_http_error(e))?;

        match response.status() {
            StatusCode::OK => {
                let api_response: ApiResponse<Vec<SearchHit>> =
                    response.json().await.map_err(|e| {
                        EngineError::index(format!("Failed to parse response: {}", e))
                    })?;

                match api_response.status.as_str() {
                    "success" => Ok(api_response.data.unwrap_or_default()),
                    _ => {
                        let error_msg = api_response
                            .error
                            .unwrap_or_else(|| "Unknown error".to_string());
                        Err(EngineError::index(error_msg))
                    }
                }
            }
            // Query never creates; an absent collection simply has no hits.
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status => {
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP error: {}", status));
                Err(EngineError::index(error_body))
            }
        }
    }
}
