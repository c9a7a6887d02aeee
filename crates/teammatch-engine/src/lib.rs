//! Teammatch Engine
//!
//! The matching engine proper: embedding generation with caching, the
//! vector index boundary, match orchestration, and the background
//! embedding sweeper. Entities and scoring come from `teammatch-core`,
//! caching from `teammatch-cache`; this crate wires them together
//! behind [`MatchingService`].

#![forbid(unsafe_code)]

pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod matching;
pub mod sweeper;
pub mod test_utils;

pub use config::{create_embedding_provider, create_vector_index, EngineConfig, MatchingConfig};
pub use embedding::{
    EmbeddingProvider, EmbeddingService, EmbeddingUseCase, HttpEmbeddingProvider,
    HttpEmbeddingProviderConfig,
};
pub use error::{EngineError, EngineResult};
pub use index::{
    HttpVectorIndex, HttpVectorIndexConfig, IndexDoc, MemoryVectorIndex, SearchHit, VectorIndex,
};
pub use matching::{MatchingService, ProjectMatch, TeammateMatch};
pub use sweeper::{EmbeddingSweeper, SweepStats, SweepTarget, SweeperConfig, SweeperTotals};

/// Initialize tracing for binaries and integration tests.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
