//! Background repair of missing embeddings.
//!
//! Entities can lose their embedding without anyone asking for a match:
//! the provider was down when they were saved, or their content changed
//! while the index was unreachable. The sweeper periodically picks up
//! such entities and pushes them back through the regular embedding
//! update path.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use teammatch_core::{ProfileRepository, ProjectRepository};

use crate::matching::MatchingService;

/// Settings for the embedding sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Time between scheduled passes
    pub interval: Duration,
    /// Maximum entities fetched per kind per pass
    pub batch_size: usize,
    /// Budget after which a pass stops early
    pub max_run_duration: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            batch_size: 50,
            max_run_duration: Duration::from_secs(30 * 60),
        }
    }
}

/// Which entity kinds a pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTarget {
    Profiles,
    Projects,
    All,
}

/// Counters for a single pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepStats {
    /// Profiles examined, including ones skipped as incomplete
    pub profiles_processed: u64,
    /// Profiles whose embedding was regenerated
    pub profiles_fixed: u64,
    /// Projects examined
    pub projects_processed: u64,
    /// Projects whose embedding was regenerated
    pub projects_fixed: u64,
    /// Entities that failed with a storage error
    pub errors: u64,
    /// Wall-clock time the pass took
    pub duration: Duration,
}

/// Cumulative counters across all passes since startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweeperTotals {
    pub runs: u64,
    pub profiles_fixed: u64,
    pub projects_fixed: u64,
    pub errors: u64,
    pub last_run: Option<DateTime<Utc>>,
}

/// Finds entities whose embedding is missing and repairs them through
/// the matching service, on a schedule or on demand.
pub struct EmbeddingSweeper {
    profiles: Arc<dyn ProfileRepository>,
    projects: Arc<dyn ProjectRepository>,
    matching: Arc<MatchingService>,
    config: SweeperConfig,
    totals: RwLock<SweeperTotals>,
    /// Serializes passes so a slow scheduled pass and a manual one
    /// never repair the same entity twice.
    run_guard: Mutex<()>,
}

impl EmbeddingSweeper {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        projects: Arc<dyn ProjectRepository>,
        matching: Arc<MatchingService>,
        config: SweeperConfig,
    ) -> Self {
        Self {
            profiles,
            projects,
            matching,
            config,
            totals: RwLock::new(SweeperTotals::default()),
            run_guard: Mutex::new(()),
        }
    }

    /// Snapshot of the cumulative counters.
    pub async fn totals(&self) -> SweeperTotals {
        self.totals.read().await.clone()
    }

    /// Runs one bounded pass over entities missing an embedding.
    #[instrument(skip(self))]
    pub async fn run_once(&self, target: SweepTarget) -> SweepStats {
        self.run_bounded(target, self.config.max_run_duration).await
    }

    /// Immediate one-off pass with a fixed one-hour budget, regardless
    /// of the configured limit. Meant for operators backfilling after
    /// an outage.
    pub async fn force_run(&self, target: SweepTarget) -> SweepStats {
        info!(?target, "Manual embedding sweep requested");
        self.run_bounded(target, Duration::from_secs(60 * 60)).await
    }

    /// Scheduled loop. Runs a pass per interval tick until the shutdown
    /// receiver resolves. The first tick fires immediately, so a boot
    /// pass repairs any backlog.
    pub async fn run(self: Arc<Self>, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        // A pass can outlast the interval; do not burst afterwards.
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            interval_secs = self.config.interval.as_secs(),
            "Embedding sweeper started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once(SweepTarget::All).await;
                }
                _ = &mut shutdown => {
                    info!("Embedding sweeper shutting down");
                    break;
                }
            }
        }
    }

    async fn run_bounded(&self, target: SweepTarget, budget: Duration) -> SweepStats {
        let _guard = self.run_guard.lock().await;
        let started = Instant::now();
        let mut stats = SweepStats::default();

        if matches!(target, SweepTarget::Profiles | SweepTarget::All) {
            self.sweep_profiles(&mut stats, started, budget).await;
        }
        if matches!(target, SweepTarget::Projects | SweepTarget::All) {
            self.sweep_projects(&mut stats, started, budget).await;
        }

        stats.duration = started.elapsed();

        {
            let mut totals = self.totals.write().await;
            totals.runs += 1;
            totals.profiles_fixed += stats.profiles_fixed;
            totals.projects_fixed += stats.projects_fixed;
            totals.errors += stats.errors;
            totals.last_run = Some(Utc::now());
        }

        info!(
            profiles_processed = stats.profiles_processed,
            profiles_fixed = stats.profiles_fixed,
            projects_processed = stats.projects_processed,
            projects_fixed = stats.projects_fixed,
            errors = stats.errors,
            duration_ms = stats.duration.as_millis() as u64,
            "Embedding sweep finished"
        );

        stats
    }

    async fn sweep_profiles(&self, stats: &mut SweepStats, started: Instant, budget: Duration) {
        if started.elapsed() >= budget {
            return;
        }

        let batch = match self.profiles.missing_embeddings(self.config.batch_size).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "Failed to list profiles missing embeddings");
                stats.errors += 1;
                return;
            }
        };

        for profile in batch {
            if started.elapsed() >= budget {
                warn!(
                    budget_secs = budget.as_secs(),
                    "Sweep budget exhausted, stopping early"
                );
                break;
            }
            stats.profiles_processed += 1;

            // Incomplete profiles stay unembeddable until their owner
            // fills them in; retrying every pass is pointless.
            if !profile.is_complete() {
                debug!(profile_id = %profile.id, "Profile incomplete, skipping");
                continue;
            }

            match self.matching.update_profile_embedding(profile.id).await {
                Ok(true) => stats.profiles_fixed += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(profile_id = %profile.id, error = %e, "Failed to repair profile embedding");
                    stats.errors += 1;
                }
            }
        }
    }

    async fn sweep_projects(&self, stats: &mut SweepStats, started: Instant, budget: Duration) {
        if started.elapsed() >= budget {
            return;
        }

        let batch = match self.projects.missing_embeddings(self.config.batch_size).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "Failed to list projects missing embeddings");
                stats.errors += 1;
                return;
            }
        };

        for project in batch {
            if started.elapsed() >= budget {
                warn!(
                    budget_secs = budget.as_secs(),
                    "Sweep budget exhausted, stopping early"
                );
                break;
            }
            stats.projects_processed += 1;

            if project.text_representation().is_empty() {
                debug!(project_id = %project.id, "Project has no text to embed, skipping");
                continue;
            }

            match self.matching.update_project_embedding(project.id).await {
                Ok(true) => stats.projects_fixed += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(project_id = %project.id, error = %e, "Failed to repair project embedding");
                    stats.errors += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, MatchingConfig};
    use crate::embedding::EmbeddingService;
    use crate::index::{MemoryVectorIndex, VectorIndex};
    use crate::test_utils::{sample_profile, sample_project, FakeEmbeddingProvider};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use teammatch_cache::{CacheStore, MemoryCache};
    use teammatch_core::{
        MemoryProfileRepository, MemoryProjectRepository, Profile, ProfileId, StoreError, UserId,
    };
    use tokio::time::timeout;

    fn build_matching(
        profiles: Arc<dyn ProfileRepository>,
        projects: Arc<dyn ProjectRepository>,
    ) -> Arc<MatchingService> {
        let config = EngineConfig {
            embedding_dimensions: 64,
            ..EngineConfig::default()
        };
        let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
        let index: Arc<dyn VectorIndex> = Arc::new(MemoryVectorIndex::new());
        let embeddings = Arc::new(EmbeddingService::new(
            Some(Arc::new(FakeEmbeddingProvider::new())),
            cache.clone(),
            &config,
        ));

        Arc::new(MatchingService::new(
            profiles,
            projects,
            embeddings,
            index,
            cache,
            MatchingConfig::default(),
        ))
    }

    fn build_sweeper(config: SweeperConfig) -> (EmbeddingSweeper, Arc<MemoryProfileRepository>, Arc<MemoryProjectRepository>) {
        let profiles = Arc::new(MemoryProfileRepository::new());
        let projects = Arc::new(MemoryProjectRepository::new());
        let matching = build_matching(profiles.clone(), projects.clone());
        let sweeper = EmbeddingSweeper::new(profiles.clone(), projects.clone(), matching, config);
        (sweeper, profiles, projects)
    }

    /// Profile store whose embedding writes always fail.
    struct BrokenEmbeddingColumn {
        inner: MemoryProfileRepository,
    }

    #[async_trait]
    impl ProfileRepository for BrokenEmbeddingColumn {
        async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError> {
            self.inner.find_by_user(user_id).await
        }

        async fn save(&self, profile: &Profile) -> Result<(), StoreError> {
            self.inner.save(profile).await
        }

        async fn set_embedding(
            &self,
            _id: &ProfileId,
            _embedding: Vec<f32>,
        ) -> Result<(), StoreError> {
            Err(StoreError::backend("embedding column rejected write"))
        }

        async fn missing_embeddings(&self, limit: usize) -> Result<Vec<Profile>, StoreError> {
            self.inner.missing_embeddings(limit).await
        }
    }

    #[tokio::test]
    async fn test_run_once_repairs_missing_embeddings() {
        let (sweeper, profiles, projects) = build_sweeper(SweeperConfig::default());

        let complete_a = sample_profile(UserId::new_v4());
        let complete_b = sample_profile(UserId::new_v4());
        let mut incomplete = sample_profile(UserId::new_v4());
        incomplete.experience_level = None;
        for profile in [&complete_a, &complete_b, &incomplete] {
            profiles.save(profile).await.unwrap();
        }

        let bare = sample_project(UserId::new_v4());
        projects.save(&bare).await.unwrap();
        let embedded = sample_project(UserId::new_v4());
        projects.save(&embedded).await.unwrap();
        projects
            .set_embedding(&embedded.id, vec![0.5; 64])
            .await
            .unwrap();

        let stats = sweeper.run_once(SweepTarget::All).await;

        assert_eq!(stats.profiles_processed, 3);
        assert_eq!(stats.profiles_fixed, 2);
        assert_eq!(stats.projects_processed, 1);
        assert_eq!(stats.projects_fixed, 1);
        assert_eq!(stats.errors, 0);

        let repaired = profiles.find_by_id(&complete_a.id).await.unwrap().unwrap();
        assert!(repaired.embedding.is_some());
        let untouched = profiles.find_by_id(&incomplete.id).await.unwrap().unwrap();
        assert!(untouched.embedding.is_none());
        let repaired = projects.find_by_id(&bare.id).await.unwrap().unwrap();
        assert!(repaired.embedding.is_some());

        let totals = sweeper.totals().await;
        assert_eq!(totals.runs, 1);
        assert_eq!(totals.profiles_fixed, 2);
        assert_eq!(totals.projects_fixed, 1);
        assert!(totals.last_run.is_some());
    }

    #[tokio::test]
    async fn test_second_pass_finds_nothing_left() {
        let (sweeper, profiles, projects) = build_sweeper(SweeperConfig::default());
        profiles
            .save(&sample_profile(UserId::new_v4()))
            .await
            .unwrap();
        projects
            .save(&sample_project(UserId::new_v4()))
            .await
            .unwrap();

        sweeper.run_once(SweepTarget::All).await;
        let second = sweeper.run_once(SweepTarget::All).await;

        assert_eq!(second.profiles_processed, 0);
        assert_eq!(second.projects_processed, 0);
        assert_eq!(second.errors, 0);
        assert_eq!(sweeper.totals().await.runs, 2);
    }

    #[tokio::test]
    async fn test_storage_failures_count_errors_and_continue() {
        let inner = MemoryProfileRepository::new();
        let profiles: Arc<dyn ProfileRepository> =
            Arc::new(BrokenEmbeddingColumn { inner });
        let projects = Arc::new(MemoryProjectRepository::new());

        profiles
            .save(&sample_profile(UserId::new_v4()))
            .await
            .unwrap();
        profiles
            .save(&sample_profile(UserId::new_v4()))
            .await
            .unwrap();

        let matching = build_matching(profiles.clone(), projects.clone());
        let sweeper = EmbeddingSweeper::new(
            profiles,
            projects,
            matching,
            SweeperConfig::default(),
        );

        let stats = sweeper.run_once(SweepTarget::Profiles).await;

        // Both entities were attempted; neither aborted the pass.
        assert_eq!(stats.profiles_processed, 2);
        assert_eq!(stats.profiles_fixed, 0);
        assert_eq!(stats.errors, 2);
        assert_eq!(sweeper.totals().await.errors, 2);
    }

    #[tokio::test]
    async fn test_exhausted_budget_stops_before_any_work() {
        let config = SweeperConfig {
            max_run_duration: Duration::ZERO,
            ..SweeperConfig::default()
        };
        let (sweeper, profiles, _projects) = build_sweeper(config);
        let profile = sample_profile(UserId::new_v4());
        profiles.save(&profile).await.unwrap();

        let stats = sweeper.run_once(SweepTarget::All).await;

        assert_eq!(stats.profiles_processed, 0);
        assert_eq!(stats.profiles_fixed, 0);
        let stored = profiles.find_by_id(&profile.id).await.unwrap().unwrap();
        assert!(stored.embedding.is_none());
        // The pass still registers, even when it did nothing.
        assert_eq!(sweeper.totals().await.runs, 1);
    }

    #[tokio::test]
    async fn test_force_run_overrides_configured_budget() {
        let config = SweeperConfig {
            max_run_duration: Duration::ZERO,
            ..SweeperConfig::default()
        };
        let (sweeper, profiles, _projects) = build_sweeper(config);
        profiles
            .save(&sample_profile(UserId::new_v4()))
            .await
            .unwrap();

        let stats = sweeper.force_run(SweepTarget::Profiles).await;

        assert_eq!(stats.profiles_fixed, 1);
    }

    #[tokio::test]
    async fn test_target_limits_which_kind_is_swept() {
        let (sweeper, profiles, projects) = build_sweeper(SweeperConfig::default());
        let profile = sample_profile(UserId::new_v4());
        profiles.save(&profile).await.unwrap();
        projects
            .save(&sample_project(UserId::new_v4()))
            .await
            .unwrap();

        let stats = sweeper.run_once(SweepTarget::Projects).await;

        assert_eq!(stats.profiles_processed, 0);
        assert_eq!(stats.projects_fixed, 1);
        let stored = profiles.find_by_id(&profile.id).await.unwrap().unwrap();
        assert!(stored.embedding.is_none());
    }

    #[tokio::test]
    async fn test_run_exits_when_shutdown_resolves() {
        let config = SweeperConfig {
            interval: Duration::from_secs(3600),
            ..SweeperConfig::default()
        };
        let (sweeper, _profiles, _projects) = build_sweeper(config);
        let sweeper = Arc::new(sweeper);

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(sweeper.run(rx));
        drop(tx);

        timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweeper did not shut down")
            .unwrap();
    }
}
