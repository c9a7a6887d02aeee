//! Shared wiring for the end-to-end tests.
//!
//! Builds the full engine over the in-memory implementations so tests
//! exercise the real orchestration paths without any network.

use std::sync::Arc;

use teammatch_cache::MemoryCache;
use teammatch_core::{MemoryProfileRepository, MemoryProjectRepository};
use teammatch_engine::test_utils::FakeEmbeddingProvider;
use teammatch_engine::{
    EmbeddingProvider, EmbeddingService, EmbeddingSweeper, EngineConfig, MatchingConfig,
    MatchingService, MemoryVectorIndex, SweeperConfig,
};

/// Dimensions used by every test embedding.
pub const TEST_DIMENSIONS: u32 = 64;

/// The full engine wired over in-memory implementations.
pub struct TestStack {
    pub profiles: Arc<MemoryProfileRepository>,
    pub projects: Arc<MemoryProjectRepository>,
    pub provider: Arc<FakeEmbeddingProvider>,
    pub index: Arc<MemoryVectorIndex>,
    pub cache: Arc<MemoryCache>,
    pub matching: Arc<MatchingService>,
    pub sweeper: Arc<EmbeddingSweeper>,
}

/// Stack with a working embedding provider.
pub fn stack() -> TestStack {
    build(true)
}

/// Stack whose embedding service has no provider configured, as when
/// no API key is present.
pub fn stack_without_provider() -> TestStack {
    build(false)
}

fn build(with_provider: bool) -> TestStack {
    let profiles = Arc::new(MemoryProfileRepository::new());
    let projects = Arc::new(MemoryProjectRepository::new());
    let provider = Arc::new(FakeEmbeddingProvider::new());
    let index = Arc::new(MemoryVectorIndex::new());
    let cache = Arc::new(MemoryCache::new());

    let config = EngineConfig {
        embedding_dimensions: TEST_DIMENSIONS,
        ..EngineConfig::default()
    };
    let embeddings = Arc::new(EmbeddingService::new(
        with_provider.then(|| provider.clone() as Arc<dyn EmbeddingProvider>),
        cache.clone(),
        &config,
    ));
    let matching = Arc::new(MatchingService::new(
        profiles.clone(),
        projects.clone(),
        embeddings,
        index.clone(),
        cache.clone(),
        MatchingConfig::default(),
    ));
    let sweeper = Arc::new(EmbeddingSweeper::new(
        profiles.clone(),
        projects.clone(),
        matching.clone(),
        SweeperConfig::default(),
    ));

    TestStack {
        profiles,
        projects,
        provider,
        index,
        cache,
        matching,
        sweeper,
    }
}
