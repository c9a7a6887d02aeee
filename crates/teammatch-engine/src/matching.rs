//! Match orchestration.
//!
//! Combines vector similarity with rule-based compatibility into ranked
//! match lists, and keeps entity embeddings in step with entity content.
//! Query paths degrade to empty results when a collaborator is down; only
//! repository failures surface as errors.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use teammatch_cache::{keys, CacheStore};
use teammatch_core::{
    score_compatibility, CompatibilityScore, Profile, ProfileId, ProfileRepository, Project,
    ProjectId, ProjectRepository, UserId,
};

use crate::config::MatchingConfig;
use crate::embedding::{EmbeddingService, EmbeddingUseCase};
use crate::error::EngineResult;
use crate::index::{IndexDoc, SearchHit, VectorIndex};

/// A project recommended to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMatch {
    /// The recommended project
    pub project: Project,
    /// Vector similarity between the profile and the project
    pub similarity: f64,
    /// Weighted compatibility total
    pub compatibility: f64,
    /// Ranking score, `(similarity + compatibility) / 2`
    pub combined: f64,
    /// Human-readable match reasons
    pub reasons: Vec<String>,
}

/// A candidate teammate recommended to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeammateMatch {
    /// The recommended profile
    pub profile: Profile,
    /// Vector similarity between the project and the profile
    pub similarity: f64,
    /// Weighted compatibility total
    pub compatibility: f64,
    /// Ranking score, `(similarity + compatibility) / 2`
    pub combined: f64,
    /// Human-readable match reasons
    pub reasons: Vec<String>,
}

/// Coordinates repositories, the embedding service, the vector index, the
/// scorer, and the cache into the public matching operations.
pub struct MatchingService {
    profiles: Arc<dyn ProfileRepository>,
    projects: Arc<dyn ProjectRepository>,
    embeddings: Arc<EmbeddingService>,
    index: Arc<dyn VectorIndex>,
    cache: Arc<dyn CacheStore>,
    config: MatchingConfig,
}

/// Extracts a uuid carried in a hit's payload field.
fn entity_uuid(hit: &SearchHit, field: &str) -> Option<Uuid> {
    let raw = hit.fields.get(field)?.as_str()?;
    Uuid::parse_str(raw).ok()
}

impl MatchingService {
    /// Creates a service over its collaborators.
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        projects: Arc<dyn ProjectRepository>,
        embeddings: Arc<EmbeddingService>,
        index: Arc<dyn VectorIndex>,
        cache: Arc<dyn CacheStore>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            profiles,
            projects,
            embeddings,
            index,
            cache,
            config,
        }
    }

    /// Recommends recruiting projects to a user, best match first.
    ///
    /// Returns an empty list when the user has no profile or no embedding
    /// yet, or when the vector index is unavailable.
    #[instrument(skip(self), fields(user_id = %user_id, limit = limit))]
    pub async fn find_project_matches(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> EngineResult<Vec<ProjectMatch>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let bucket = keys::hour_bucket(Utc::now());
        let cache_key = keys::match_results_key(keys::MatchKind::Projects, user_id, limit, &bucket);
        if let Some(cached) = self.cached_matches::<ProjectMatch>(&cache_key).await {
            return Ok(cached);
        }

        let profile = match self.profiles.find_by_user(&user_id).await? {
            Some(profile) => profile,
            None => {
                warn!(user_id = %user_id, "No profile for user, returning no matches");
                return Ok(Vec::new());
            }
        };

        let embedding = match &profile.embedding {
            Some(embedding) => embedding,
            None => {
                warn!(profile_id = %profile.id, "Profile has no embedding yet, returning no matches");
                return Ok(Vec::new());
            }
        };

        let top_k = limit * self.config.overfetch_factor;
        let hits = match self
            .index
            .query(&self.config.projects_collection, embedding, top_k)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Vector search failed, returning no matches");
                return Ok(Vec::new());
            }
        };

        debug!(hit_count = hits.len(), "Vector search returned project candidates");

        let mut matches = Vec::new();
        for hit in hits {
            let project_id = match entity_uuid(&hit, "project_id") {
                Some(id) => ProjectId(id),
                None => {
                    debug!(hit_id = %hit.id, "Hit carries no usable project id, dropping");
                    continue;
                }
            };

            let project = match self.projects.find_by_id(&project_id).await? {
                Some(project) => project,
                None => {
                    debug!(project_id = %project_id, "Indexed project no longer loads, dropping");
                    continue;
                }
            };

            if !project.is_recruiting() || project.owner_id == user_id {
                continue;
            }

            let score = self.compatibility_for(&profile, &project).await;
            let similarity = f64::from(hit.score);
            let combined = (similarity + score.total) / 2.0;

            matches.push(ProjectMatch {
                project,
                similarity,
                compatibility: score.total,
                combined,
                reasons: score.reasons,
            });
        }

        sort_by_combined(&mut matches, |m| m.combined);
        matches.truncate(limit);

        self.cache_matches(&cache_key, &matches).await;

        Ok(matches)
    }

    /// Recommends candidate teammates to a project, best match first.
    ///
    /// Returns an empty list when the project is missing or has no
    /// embedding yet, or when the vector index is unavailable.
    #[instrument(skip(self), fields(project_id = %project_id, limit = limit))]
    pub async fn find_teammate_matches(
        &self,
        project_id: ProjectId,
        limit: usize,
    ) -> EngineResult<Vec<TeammateMatch>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let bucket = keys::hour_bucket(Utc::now());
        let cache_key =
            keys::match_results_key(keys::MatchKind::Teammates, project_id, limit, &bucket);
        if let Some(cached) = self.cached_matches::<TeammateMatch>(&cache_key).await {
            return Ok(cached);
        }

        let project = match self.projects.find_by_id(&project_id).await? {
            Some(project) => project,
            None => {
                warn!(project_id = %project_id, "No such project, returning no matches");
                return Ok(Vec::new());
            }
        };

        let embedding = match &project.embedding {
            Some(embedding) => embedding,
            None => {
                warn!(project_id = %project_id, "Project has no embedding yet, returning no matches");
                return Ok(Vec::new());
            }
        };

        let top_k = limit * self.config.overfetch_factor;
        let hits = match self
            .index
            .query(&self.config.profiles_collection, embedding, top_k)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(project_id = %project_id, error = %e, "Vector search failed, returning no matches");
                return Ok(Vec::new());
            }
        };

        debug!(hit_count = hits.len(), "Vector search returned profile candidates");

        let mut matches = Vec::new();
        for hit in hits {
            let profile_id = match entity_uuid(&hit, "profile_id") {
                Some(id) => ProfileId(id),
                None => {
                    debug!(hit_id = %hit.id, "Hit carries no usable profile id, dropping");
                    continue;
                }
            };

            let profile = match self.profiles.find_by_id(&profile_id).await? {
                Some(profile) => profile,
                None => {
                    debug!(profile_id = %profile_id, "Indexed profile no longer loads, dropping");
                    continue;
                }
            };

            if !profile.is_active || profile.user_id == project.owner_id {
                continue;
            }

            let score = self.compatibility_for(&profile, &project).await;
            let similarity = f64::from(hit.score);
            let combined = (similarity + score.total) / 2.0;

            matches.push(TeammateMatch {
                profile,
                similarity,
                compatibility: score.total,
                combined,
                reasons: score.reasons,
            });
        }

        sort_by_combined(&mut matches, |m| m.combined);
        matches.truncate(limit);

        self.cache_matches(&cache_key, &matches).await;

        Ok(matches)
    }

    /// Regenerates and persists a profile's embedding from its current
    /// text, then invalidates every cache entry the change staled.
    ///
    /// Returns whether an embedding was written. Incomplete profiles are
    /// skipped so half-filled profiles never enter the index.
    #[instrument(skip(self), fields(profile_id = %profile_id))]
    pub async fn update_profile_embedding(&self, profile_id: ProfileId) -> EngineResult<bool> {
        let profile = match self.profiles.find_by_id(&profile_id).await? {
            Some(profile) => profile,
            None => {
                debug!(profile_id = %profile_id, "No such profile, nothing to embed");
                return Ok(false);
            }
        };

        if !profile.is_complete() {
            debug!(profile_id = %profile_id, "Profile incomplete, skipping embedding");
            return Ok(false);
        }

        let text = profile.text_representation();
        let vector = match self.embeddings.generate(&text, EmbeddingUseCase::Matching).await {
            Some(vector) => vector,
            None => return Ok(false),
        };

        self.profiles.set_embedding(&profile.id, vector.clone()).await?;

        let doc = IndexDoc {
            id: format!("profile_{}", profile.id),
            vector,
            fields: serde_json::json!({
                "profile_id": profile.id.to_string(),
                "text": text,
            }),
        };
        if let Err(e) = self
            .index
            .upsert(&self.config.profiles_collection, vec![doc])
            .await
        {
            warn!(profile_id = %profile_id, error = %e, "Vector index upsert failed, embedding stored anyway");
        }

        self.invalidate(&keys::compatibility_pattern_for_profile(&profile.id))
            .await;
        self.invalidate(&keys::match_results_pattern(
            keys::MatchKind::Projects,
            profile.user_id,
        ))
        .await;

        Ok(true)
    }

    /// Regenerates and persists a project's embedding from its current
    /// text, then invalidates every cache entry the change staled.
    ///
    /// Returns whether an embedding was written. Deleted projects and
    /// projects with nothing to say are skipped.
    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn update_project_embedding(&self, project_id: ProjectId) -> EngineResult<bool> {
        let project = match self.projects.find_by_id(&project_id).await? {
            Some(project) => project,
            None => {
                debug!(project_id = %project_id, "No such project, nothing to embed");
                return Ok(false);
            }
        };

        if project.is_deleted {
            debug!(project_id = %project_id, "Project deleted, skipping embedding");
            return Ok(false);
        }

        let text = project.text_representation();
        let vector = match self.embeddings.generate(&text, EmbeddingUseCase::Matching).await {
            Some(vector) => vector,
            None => return Ok(false),
        };

        self.projects.set_embedding(&project.id, vector.clone()).await?;

        let doc = IndexDoc {
            id: format!("project_{}", project.id),
            vector,
            fields: serde_json::json!({
                "project_id": project.id.to_string(),
                "text": text,
            }),
        };
        if let Err(e) = self
            .index
            .upsert(&self.config.projects_collection, vec![doc])
            .await
        {
            warn!(project_id = %project_id, error = %e, "Vector index upsert failed, embedding stored anyway");
        }

        self.invalidate(&keys::compatibility_pattern_for_project(&project.id))
            .await;
        self.invalidate(&keys::match_results_pattern(
            keys::MatchKind::Teammates,
            project.id,
        ))
        .await;

        Ok(true)
    }

    /// Cache-aside wrapper around the pure scorer.
    async fn compatibility_for(&self, profile: &Profile, project: &Project) -> CompatibilityScore {
        let key = keys::compatibility_key(&profile.id, &project.id);

        match self.cache.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value::<CompatibilityScore>(value) {
                Ok(score) => return score,
                Err(e) => debug!(key = %key, error = %e, "Cached compatibility is unreadable, rescoring"),
            },
            Ok(None) => {}
            Err(e) => debug!(key = %key, error = %e, "Compatibility cache read failed"),
        }

        let score = score_compatibility(profile, project);

        match serde_json::to_value(&score) {
            Ok(value) => {
                if let Err(e) = self
                    .cache
                    .set(&key, value, self.config.compatibility_ttl)
                    .await
                {
                    debug!(key = %key, error = %e, "Failed to cache compatibility score");
                }
            }
            Err(e) => debug!(key = %key, error = %e, "Failed to serialize compatibility score"),
        }

        score
    }

    /// Reads a cached result set; any failure is a miss.
    async fn cached_matches<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        match self.cache.get(key).await {
            Ok(Some(value)) => match serde_json::from_value::<Vec<T>>(value) {
                Ok(matches) => {
                    debug!(key = %key, "Match results served from cache");
                    Some(matches)
                }
                Err(e) => {
                    debug!(key = %key, error = %e, "Cached match results are unreadable");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!(key = %key, error = %e, "Match results cache read failed");
                None
            }
        }
    }

    /// Best-effort write of a result set.
    async fn cache_matches<T: Serialize>(&self, key: &str, matches: &[T]) {
        match serde_json::to_value(matches) {
            Ok(value) => {
                if let Err(e) = self
                    .cache
                    .set(key, value, self.config.match_results_ttl)
                    .await
                {
                    debug!(key = %key, error = %e, "Failed to cache match results");
                }
            }
            Err(e) => debug!(key = %key, error = %e, "Failed to serialize match results"),
        }
    }

    /// Best-effort pattern invalidation.
    async fn invalidate(&self, pattern: &str) {
        match self.cache.delete_pattern(pattern).await {
            Ok(removed) => debug!(pattern = %pattern, removed = removed, "Invalidated cache entries"),
            Err(e) => debug!(pattern = %pattern, error = %e, "Cache invalidation failed"),
        }
    }
}

/// Stable descending sort; ties keep the order the index returned.
fn sort_by_combined<T>(matches: &mut [T], combined: impl Fn(&T) -> f64) {
    matches.sort_by(|a, b| {
        combined(b)
            .partial_cmp(&combined(a))
            .unwrap_or(Ordering::Equal)
    });
}
