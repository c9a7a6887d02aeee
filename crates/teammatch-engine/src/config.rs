//! Configuration for the matching engine
//!
//! `EngineConfig` loads connection settings from environment variables;
//! `MatchingConfig` carries the orchestrator's tuning knobs. The factory
//! functions build the provider and index clients, degrading to absent or
//! in-process implementations when credentials are missing.

use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use teammatch_cache::keys;

use crate::embedding::{EmbeddingProvider, HttpEmbeddingProvider, HttpEmbeddingProviderConfig};
use crate::error::{EngineError, EngineResult};
use crate::index::{HttpVectorIndex, HttpVectorIndexConfig, MemoryVectorIndex, VectorIndex};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// API key for the embedding provider; absent disables generation
    #[serde(default)]
    pub embedding_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible embedding endpoint
    #[serde(default = "default_embedding_base_url")]
    pub embedding_base_url: String,

    /// Embedding model identifier
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Vector width requested from the provider
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,

    /// Endpoint of the vector index service; absent selects the
    /// in-process index
    #[serde(default)]
    pub index_endpoint: Option<String>,

    /// API key for the vector index service
    #[serde(default)]
    pub index_api_key: Option<String>,

    /// Timeout in seconds for outbound HTTP requests
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-v4".to_string()
}

fn default_embedding_dimensions() -> u32 {
    1024
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            embedding_api_key: None,
            embedding_base_url: default_embedding_base_url(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            index_endpoint: None,
            index_api_key: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn load() -> EngineResult<Self> {
        // Start with defaults
        let mut config = Self::default();

        // Override from environment variables
        if let Ok(api_key) = env::var("TEAMMATCH_EMBEDDING_API_KEY") {
            config.embedding_api_key = Some(api_key);
        }

        if let Ok(base_url) = env::var("TEAMMATCH_EMBEDDING_BASE_URL") {
            config.embedding_base_url = base_url;
        }

        if let Ok(model) = env::var("TEAMMATCH_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }

        if let Ok(dimensions) = env::var("TEAMMATCH_EMBEDDING_DIMENSIONS") {
            if let Ok(dimensions) = dimensions.parse::<u32>() {
                config.embedding_dimensions = dimensions;
            } else {
                warn!(
                    "Invalid TEAMMATCH_EMBEDDING_DIMENSIONS value: {}",
                    dimensions
                );
            }
        }

        if let Ok(endpoint) = env::var("TEAMMATCH_INDEX_ENDPOINT") {
            config.index_endpoint = Some(endpoint);
        }

        if let Ok(api_key) = env::var("TEAMMATCH_INDEX_API_KEY") {
            config.index_api_key = Some(api_key);
        }

        if let Ok(timeout) = env::var("TEAMMATCH_REQUEST_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                config.request_timeout_secs = timeout;
            } else {
                warn!("Invalid TEAMMATCH_REQUEST_TIMEOUT_SECS value: {}", timeout);
            }
        }

        config.validate()?;

        // Missing credentials degrade features instead of failing startup
        if config.embedding_api_key.is_none() {
            warn!("No TEAMMATCH_EMBEDDING_API_KEY provided - embedding generation is disabled");
        }

        if config.index_endpoint.is_none() {
            info!("No TEAMMATCH_INDEX_ENDPOINT provided - using the in-process vector index");
        }

        info!("Loaded engine configuration");
        Ok(config)
    }

    /// Validate structural requirements the defaults cannot guarantee
    pub fn validate(&self) -> EngineResult<()> {
        if self.embedding_base_url.trim().is_empty() {
            return Err(EngineError::config("Embedding base URL must not be empty"));
        }

        if self.embedding_model.trim().is_empty() {
            return Err(EngineError::config("Embedding model must not be empty"));
        }

        if self.embedding_dimensions == 0 {
            return Err(EngineError::config(
                "Embedding dimensions must be positive",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(EngineError::config("Request timeout must be positive"));
        }

        Ok(())
    }
}

/// Tuning knobs for the match orchestrator
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Overfetch multiplier applied to `limit` on index queries
    pub overfetch_factor: usize,

    /// Collection holding profile vectors
    pub profiles_collection: String,

    /// Collection holding project vectors
    pub projects_collection: String,

    /// TTL for cached compatibility scores
    pub compatibility_ttl: Duration,

    /// TTL for cached match results
    pub match_results_ttl: Duration,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            overfetch_factor: 2,
            profiles_collection: "user_profiles".to_string(),
            projects_collection: "projects".to_string(),
            compatibility_ttl: keys::COMPATIBILITY_TTL,
            match_results_ttl: keys::MATCH_RESULTS_TTL,
        }
    }
}

/// Builds the embedding provider from configuration.
///
/// Returns `None` when no API key is configured; the embedding service
/// then serves cached vectors only.
pub fn create_embedding_provider(config: &EngineConfig) -> Option<Arc<dyn EmbeddingProvider>> {
    let api_key = config.embedding_api_key.clone()?;

    Some(Arc::new(HttpEmbeddingProvider::new(
        HttpEmbeddingProviderConfig {
            base_url: config.embedding_base_url.clone(),
            api_key,
            timeout_secs: config.request_timeout_secs,
        },
    )))
}

/// Builds the vector index from configuration.
///
/// Falls back to the in-process index when no endpoint is configured.
pub fn create_vector_index(config: &EngineConfig) -> Arc<dyn VectorIndex> {
    match &config.index_endpoint {
        Some(endpoint) => Arc::new(HttpVectorIndex::new(HttpVectorIndexConfig {
            endpoint: endpoint.clone(),
            api_key: config.index_api_key.clone(),
            dimensions: config.embedding_dimensions,
            timeout_secs: config.request_timeout_secs,
        })),
        None => Arc::new(MemoryVectorIndex::new()),
    }
}
