//! Deterministic fakes and entity builders for tests.
//!
//! Everything here runs in process and without a network so test behavior
//! is reproducible run to run.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use teammatch_cache::{CacheError, CacheStore};
use teammatch_core::{DifficultyLevel, ExperienceLevel, Profile, Project, UserId};

use crate::embedding::EmbeddingProvider;
use crate::error::{EngineError, EngineResult};
use crate::index::{IndexDoc, SearchHit, VectorIndex};

/// Embedding provider that derives vectors from the input text.
///
/// Counts calls so tests can assert on caching behavior, and can be
/// switched into a failing mode for degradation tests.
#[derive(Debug, Default)]
pub struct FakeEmbeddingProvider {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl FakeEmbeddingProvider {
    /// Creates a provider in working mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of embed calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn deterministic_vector(&self, text: &str, dimensions: usize) -> Vec<f32> {
        let text_hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
        let mut embedding: Vec<f32> = (0..dimensions)
            .map(|i| ((text_hash + i as u64) % 100) as f32 / 100.0)
            .collect();

        // Nudge a few positions for common topics so related texts score
        // closer than unrelated ones.
        if dimensions >= 6 {
            let lowered = text.to_lowercase();
            if lowered.contains("rust") || lowered.contains("backend") {
                embedding[0] = 0.9;
                embedding[1] = 0.8;
            }
            if lowered.contains("web") || lowered.contains("frontend") {
                embedding[2] = 0.85;
                embedding[3] = 0.75;
            }
            if lowered.contains("data") || lowered.contains("learning") {
                embedding[4] = 0.9;
                embedding[5] = 0.8;
            }
        }

        // Normalize the embedding
        let magnitude: f32 = embedding.iter().map(|&v| v * v).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbeddingProvider {
    async fn embed(&self, text: &str, _model: &str, dimensions: u32) -> EngineResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(EngineError::provider("Provider switched off for this test"));
        }

        Ok(self.deterministic_vector(text, dimensions as usize))
    }
}

/// Cache whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
        Err(CacheError::backend("cache offline"))
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::backend("cache offline"))
    }

    async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::backend("cache offline"))
    }

    async fn delete_pattern(&self, _pattern: &str) -> Result<u64, CacheError> {
        Err(CacheError::backend("cache offline"))
    }
}

/// Vector index whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingVectorIndex;

#[async_trait]
impl VectorIndex for FailingVectorIndex {
    async fn upsert(&self, _collection: &str, _docs: Vec<IndexDoc>) -> EngineResult<()> {
        Err(EngineError::index("index offline"))
    }

    async fn query(
        &self,
        _collection: &str,
        _vector: &[f32],
        _top_k: usize,
    ) -> EngineResult<Vec<SearchHit>> {
        Err(EngineError::index("index offline"))
    }
}

/// A complete, active profile ready for matching.
pub fn sample_profile(user_id: UserId) -> Profile {
    let mut profile = Profile::new(user_id, "Backend developer who enjoys systems work");
    profile.skills = vec!["rust".to_string(), "python".to_string()];
    profile.interests = vec!["databases".to_string()];
    profile.preferred_roles = vec!["backend developer".to_string()];
    profile.experience_level = Some(ExperienceLevel::Intermediate);
    profile.availability = Some("10 hrs/week".to_string());
    profile
}

/// A recruiting project ready for matching.
pub fn sample_project(owner_id: UserId) -> Project {
    let mut project = Project::new(
        owner_id,
        "Chat server",
        "Building a realtime chat backend with message persistence",
    );
    project.goal = "Ship a beta in three months".to_string();
    project.required_skills = vec!["rust".to_string()];
    project.preferred_skills = vec!["python".to_string()];
    project.project_type = Some("web app".to_string());
    project.difficulty = Some(DifficultyLevel::Intermediate);
    project.looking_for = vec!["backend developer".to_string()];
    project
}
