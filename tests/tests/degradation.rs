//! Collaborator outages must degrade matching, never break it: queries
//! return empty or recomputed results and repository writes survive.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use teammatch_cache::{CacheStore, MemoryCache};
use teammatch_core::{MemoryProfileRepository, MemoryProjectRepository, UserId};
use teammatch_engine::test_utils::{
    sample_profile, sample_project, FailingCache, FailingVectorIndex, FakeEmbeddingProvider,
};
use teammatch_engine::{
    EmbeddingProvider, EmbeddingService, EngineConfig, MatchingConfig, MatchingService,
    MemoryVectorIndex, VectorIndex,
};
use teammatch_tests::{stack, stack_without_provider, TEST_DIMENSIONS};

fn custom_stack(
    index: Arc<dyn VectorIndex>,
    cache: Arc<dyn CacheStore>,
) -> (
    Arc<MemoryProfileRepository>,
    Arc<MemoryProjectRepository>,
    Arc<FakeEmbeddingProvider>,
    MatchingService,
) {
    let profiles = Arc::new(MemoryProfileRepository::new());
    let projects = Arc::new(MemoryProjectRepository::new());
    let provider = Arc::new(FakeEmbeddingProvider::new());

    let config = EngineConfig {
        embedding_dimensions: TEST_DIMENSIONS,
        ..EngineConfig::default()
    };
    let embeddings = Arc::new(EmbeddingService::new(
        Some(provider.clone() as Arc<dyn EmbeddingProvider>),
        cache.clone(),
        &config,
    ));
    let matching = MatchingService::new(
        profiles.clone(),
        projects.clone(),
        embeddings,
        index,
        cache,
        MatchingConfig::default(),
    );

    (profiles, projects, provider, matching)
}

#[tokio::test]
async fn missing_provider_disables_embedding_quietly() {
    let stack = stack_without_provider();
    let profile = sample_profile(UserId::new_v4());
    stack.profiles.save(&profile).await.unwrap();

    let updated = stack
        .matching
        .update_profile_embedding(profile.id)
        .await
        .unwrap();
    assert!(!updated);
    assert_eq!(stack.provider.call_count(), 0);

    let stored = stack.profiles.find_by_id(&profile.id).await.unwrap().unwrap();
    assert!(stored.embedding.is_none());

    // Matching still answers, it just has nothing to say.
    let matches = stack
        .matching
        .find_project_matches(profile.user_id, 5)
        .await
        .unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn provider_failure_is_absorbed_and_recovery_works() {
    let stack = stack();
    let profile = sample_profile(UserId::new_v4());
    stack.profiles.save(&profile).await.unwrap();

    stack.provider.set_failing(true);
    let updated = stack
        .matching
        .update_profile_embedding(profile.id)
        .await
        .unwrap();
    assert!(!updated);
    assert_eq!(stack.provider.call_count(), 1);

    // Failures are not cached; the next attempt reaches the provider.
    stack.provider.set_failing(false);
    let updated = stack
        .matching
        .update_profile_embedding(profile.id)
        .await
        .unwrap();
    assert!(updated);
    assert_eq!(stack.provider.call_count(), 2);
}

#[tokio::test]
async fn index_outage_does_not_lose_the_store_write() {
    let (profiles, _projects, _provider, matching) =
        custom_stack(Arc::new(FailingVectorIndex), Arc::new(MemoryCache::new()));

    let profile = sample_profile(UserId::new_v4());
    profiles.save(&profile).await.unwrap();

    // The repository write counts as success even when indexing fails.
    let updated = matching.update_profile_embedding(profile.id).await.unwrap();
    assert!(updated);
    let stored = profiles.find_by_id(&profile.id).await.unwrap().unwrap();
    assert!(stored.embedding.is_some());

    let matches = matching
        .find_project_matches(profile.user_id, 5)
        .await
        .unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn cache_outage_degrades_to_recomputation() {
    let (profiles, projects, provider, matching) =
        custom_stack(Arc::new(MemoryVectorIndex::new()), Arc::new(FailingCache));

    let profile = sample_profile(UserId::new_v4());
    profiles.save(&profile).await.unwrap();
    assert!(matching.update_profile_embedding(profile.id).await.unwrap());

    let project = sample_project(UserId::new_v4());
    projects.save(&project).await.unwrap();
    assert!(matching.update_project_embedding(project.id).await.unwrap());

    // Every lookup misses, so the second identical update regenerates.
    assert!(matching.update_profile_embedding(profile.id).await.unwrap());
    assert_eq!(provider.call_count(), 3);

    // Matching still works end to end without a single cache entry.
    let matches = matching
        .find_project_matches(profile.user_id, 5)
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].project.id, project.id);
}
