//! User profile aggregate

use crate::identifiers::{ProfileId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Self-reported experience level of a profile owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    /// Little or no prior project experience
    Beginner,

    /// Comfortable contributing with some guidance
    Intermediate,

    /// Works independently on non-trivial problems
    Advanced,

    /// Deep experience, can lead others
    Expert,
}

impl ExperienceLevel {
    /// Ordinal rank used by the compatibility scorer.
    pub fn rank(&self) -> u8 {
        match self {
            ExperienceLevel::Beginner => 0,
            ExperienceLevel::Intermediate => 1,
            ExperienceLevel::Advanced => 2,
            ExperienceLevel::Expert => 3,
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
            ExperienceLevel::Expert => "expert",
        };
        write!(f, "{}", s)
    }
}

/// Aggregate: one user's matching-relevant attributes.
///
/// The embedding is derived data: regenerated whenever profile content
/// changes and the profile is complete, never edited directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier
    pub id: ProfileId,

    /// Owning user
    pub user_id: UserId,

    /// Free-text bio
    pub bio: String,

    /// Skill tags
    pub skills: Vec<String>,

    /// Interest tags
    pub interests: Vec<String>,

    /// Research area tags
    pub research_areas: Vec<String>,

    /// Role tags the user wants to fill
    pub preferred_roles: Vec<String>,

    /// Self-assessed experience level
    pub experience_level: Option<ExperienceLevel>,

    /// Free-text availability, e.g. "part-time" or "weekends"
    pub availability: Option<String>,

    /// Stored embedding vector, `None` until generated
    pub embedding: Option<Vec<f32>>,

    /// Inactive profiles are excluded from matching
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a new active profile for `user_id`.
    pub fn new(user_id: UserId, bio: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProfileId::new_v4(),
            user_id,
            bio: bio.into(),
            skills: Vec::new(),
            interests: Vec::new(),
            research_areas: Vec::new(),
            preferred_roles: Vec::new(),
            experience_level: None,
            availability: None,
            embedding: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Text fed to the embedding provider. Deterministic for equal field
    /// values: the embedding cache is keyed off this string.
    pub fn text_representation(&self) -> String {
        let mut parts = Vec::new();
        if !self.bio.trim().is_empty() {
            parts.push(format!("Bio: {}", self.bio));
        }
        if !self.skills.is_empty() {
            parts.push(format!("Skills: {}", self.skills.join(", ")));
        }
        if !self.interests.is_empty() {
            parts.push(format!("Interests: {}", self.interests.join(", ")));
        }
        if !self.research_areas.is_empty() {
            parts.push(format!("Research Areas: {}", self.research_areas.join(", ")));
        }
        if let Some(level) = self.experience_level {
            parts.push(format!("Experience Level: {}", level));
        }
        if !self.preferred_roles.is_empty() {
            parts.push(format!("Preferred Roles: {}", self.preferred_roles.join(", ")));
        }
        parts.join(" | ")
    }

    /// A profile is complete once it carries a bio, at least one skill,
    /// and an experience level. Embeddings are only generated for
    /// complete profiles.
    pub fn is_complete(&self) -> bool {
        !self.bio.trim().is_empty() && !self.skills.is_empty() && self.experience_level.is_some()
    }
}
