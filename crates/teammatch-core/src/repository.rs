//! Repository traits for the Teammatch engine
//!
//! The matching layer reads profiles and projects through these traits.
//! External crates can implement them over any relational store; the
//! in-memory implementations below back tests and embedded deployments.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::identifiers::{ProfileId, ProjectId, UserId};
use crate::profile::Profile;
use crate::project::Project;

/// Repository for user profiles
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find a profile by ID
    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError>;

    /// Find the profile owned by a user
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError>;

    /// Save a profile (insert or replace)
    async fn save(&self, profile: &Profile) -> Result<(), StoreError>;

    /// Replace the stored embedding for a profile and bump `updated_at`
    async fn set_embedding(&self, id: &ProfileId, embedding: Vec<f32>) -> Result<(), StoreError>;

    /// Active profiles with no embedding, oldest first, at most `limit`
    async fn missing_embeddings(&self, limit: usize) -> Result<Vec<Profile>, StoreError>;
}

/// Repository for projects
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Find a project by ID
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, StoreError>;

    /// Projects created by a user
    async fn list_by_owner(&self, owner_id: &UserId) -> Result<Vec<Project>, StoreError>;

    /// Save a project (insert or replace)
    async fn save(&self, project: &Project) -> Result<(), StoreError>;

    /// Replace the stored embedding for a project and bump `updated_at`
    async fn set_embedding(&self, id: &ProjectId, embedding: Vec<f32>) -> Result<(), StoreError>;

    /// Non-deleted projects with no embedding, oldest first, at most `limit`
    async fn missing_embeddings(&self, limit: usize) -> Result<Vec<Project>, StoreError>;
}

pub use memory::{MemoryProfileRepository, MemoryProjectRepository};

/// In-memory repository implementations
pub mod memory {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory profile repository.
    #[derive(Default, Clone)]
    pub struct MemoryProfileRepository {
        profiles: Arc<RwLock<HashMap<ProfileId, Profile>>>,
    }

    impl MemoryProfileRepository {
        /// Create an empty repository.
        pub fn new() -> Self {
            Self {
                profiles: Arc::new(RwLock::new(HashMap::new())),
            }
        }
    }

    #[async_trait]
    impl ProfileRepository for MemoryProfileRepository {
        async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError> {
            Ok(self.profiles.read().await.get(id).cloned())
        }

        async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError> {
            Ok(self
                .profiles
                .read()
                .await
                .values()
                .find(|p| p.user_id == *user_id)
                .cloned())
        }

        async fn save(&self, profile: &Profile) -> Result<(), StoreError> {
            self.profiles
                .write()
                .await
                .insert(profile.id, profile.clone());
            Ok(())
        }

        async fn set_embedding(
            &self,
            id: &ProfileId,
            embedding: Vec<f32>,
        ) -> Result<(), StoreError> {
            let mut profiles = self.profiles.write().await;
            let profile = profiles
                .get_mut(id)
                .ok_or_else(|| StoreError::not_found("profile", id))?;
            profile.embedding = Some(embedding);
            profile.updated_at = Utc::now();
            Ok(())
        }

        async fn missing_embeddings(&self, limit: usize) -> Result<Vec<Profile>, StoreError> {
            let profiles = self.profiles.read().await;
            let mut missing: Vec<Profile> = profiles
                .values()
                .filter(|p| p.is_active && p.embedding.is_none())
                .cloned()
                .collect();
            missing.sort_by_key(|p| (p.created_at, p.id.0));
            missing.truncate(limit);
            Ok(missing)
        }
    }

    /// In-memory project repository.
    #[derive(Default, Clone)]
    pub struct MemoryProjectRepository {
        projects: Arc<RwLock<HashMap<ProjectId, Project>>>,
    }

    impl MemoryProjectRepository {
        /// Create an empty repository.
        pub fn new() -> Self {
            Self {
                projects: Arc::new(RwLock::new(HashMap::new())),
            }
        }
    }

    #[async_trait]
    impl ProjectRepository for MemoryProjectRepository {
        async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
            Ok(self.projects.read().await.get(id).cloned())
        }

        async fn list_by_owner(&self, owner_id: &UserId) -> Result<Vec<Project>, StoreError> {
            let projects = self.projects.read().await;
            let mut owned: Vec<Project> = projects
                .values()
                .filter(|p| p.owner_id == *owner_id)
                .cloned()
                .collect();
            owned.sort_by_key(|p| (p.created_at, p.id.0));
            Ok(owned)
        }

        async fn save(&self, project: &Project) -> Result<(), StoreError> {
            self.projects
                .write()
                .await
                .insert(project.id, project.clone());
            Ok(())
        }

        async fn set_embedding(
            &self,
            id: &ProjectId,
            embedding: Vec<f32>,
        ) -> Result<(), StoreError> {
            let mut projects = self.projects.write().await;
            let project = projects
                .get_mut(id)
                .ok_or_else(|| StoreError::not_found("project", id))?;
            project.embedding = Some(embedding);
            project.updated_at = Utc::now();
            Ok(())
        }

        async fn missing_embeddings(&self, limit: usize) -> Result<Vec<Project>, StoreError> {
            let projects = self.projects.read().await;
            let mut missing: Vec<Project> = projects
                .values()
                .filter(|p| !p.is_deleted && p.embedding.is_none())
                .cloned()
                .collect();
            missing.sort_by_key(|p| (p.created_at, p.id.0));
            missing.truncate(limit);
            Ok(missing)
        }
    }
}
