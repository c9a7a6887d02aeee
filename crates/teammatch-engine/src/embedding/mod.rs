//! Embedding generation for profile and project text.
//!
//! The provider trait hides the remote API; [`EmbeddingService`] fronts it
//! with a content-addressed cache and absorbs provider failures so callers
//! degrade instead of erroring.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use teammatch_cache::{keys, CacheStore};

use crate::config::EngineConfig;
use crate::error::EngineResult;

mod http;

pub use http::{HttpEmbeddingProvider, HttpEmbeddingProviderConfig};

/// What a requested vector will be used for.
///
/// One provider configuration serves every use case today; the split keeps
/// cache keys stable if the model table ever diverges per use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingUseCase {
    /// Vectors compared across profiles and projects for matching
    Matching,
    /// Vectors backing free-text semantic search
    Search,
    /// Vectors summarizing long-form content
    Content,
}

impl EmbeddingUseCase {
    /// Cache key segment for this use case.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingUseCase::Matching => "matching",
            EmbeddingUseCase::Search => "search",
            EmbeddingUseCase::Content => "content",
        }
    }
}

impl fmt::Display for EmbeddingUseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remote text-embedding API behind a narrow seam.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds `text` with the given model, returning a vector of exactly
    /// `dimensions` entries.
    async fn embed(&self, text: &str, model: &str, dimensions: u32) -> EngineResult<Vec<f32>>;
}

/// Cached front door for embedding generation.
///
/// The provider is optional: without one the service still serves cached
/// vectors and reports everything else as unavailable.
pub struct EmbeddingService {
    provider: Option<Arc<dyn EmbeddingProvider>>,
    cache: Arc<dyn CacheStore>,
    model: String,
    dimensions: u32,
}

impl EmbeddingService {
    /// Creates a service over an optional provider.
    pub fn new(
        provider: Option<Arc<dyn EmbeddingProvider>>,
        cache: Arc<dyn CacheStore>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            model: config.embedding_model.clone(),
            dimensions: config.embedding_dimensions,
        }
    }

    /// Model configuration for a use case.
    fn model_for(&self, _use_case: EmbeddingUseCase) -> (&str, u32) {
        (&self.model, self.dimensions)
    }

    /// Returns a vector for `text`, or `None` when generation is not
    /// possible right now (blank input, no provider, provider failure).
    ///
    /// Never returns an error: callers treat an absent vector as "skip",
    /// not as a fault to propagate.
    pub async fn generate(&self, text: &str, use_case: EmbeddingUseCase) -> Option<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let (model, dimensions) = self.model_for(use_case);
        let hash = keys::content_hash(text, use_case.as_str(), model);
        let key = keys::embedding_key(use_case.as_str(), &hash);

        match self.cache.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value::<Vec<f32>>(value) {
                Ok(vector) => {
                    debug!(use_case = %use_case, "Embedding cache hit");
                    return Some(vector);
                }
                Err(e) => {
                    debug!(
                        use_case = %use_case,
                        error = %e,
                        "Cached embedding is unreadable, regenerating"
                    );
                }
            },
            Ok(None) => {}
            Err(e) => debug!(use_case = %use_case, error = %e, "Embedding cache read failed"),
        }

        let provider = match &self.provider {
            Some(provider) => provider,
            None => {
                warn!(use_case = %use_case, "No embedding provider configured, skipping generation");
                return None;
            }
        };

        let vector = match provider.embed(text, model, dimensions).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(use_case = %use_case, error = %e, "Embedding generation failed");
                return None;
            }
        };

        match serde_json::to_value(&vector) {
            Ok(value) => {
                if let Err(e) = self.cache.set(&key, value, keys::EMBEDDING_TTL).await {
                    warn!(use_case = %use_case, error = %e, "Failed to cache embedding");
                }
            }
            Err(e) => {
                warn!(use_case = %use_case, error = %e, "Failed to serialize embedding for caching");
            }
        }

        Some(vector)
    }
}
