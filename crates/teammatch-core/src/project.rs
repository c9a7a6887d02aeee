//! Project aggregate

use crate::identifiers::{ProjectId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Accepting new teammates
    Recruiting,

    /// Team assembled, work in progress
    Active,

    /// Work finished
    Completed,

    /// Abandoned before completion
    Cancelled,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectStatus::Recruiting => "recruiting",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Difficulty a project expects of its contributors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    /// Suitable for first projects
    Beginner,

    /// Assumes prior hands-on experience
    Intermediate,

    /// Demands solid independent experience
    Advanced,
}

impl DifficultyLevel {
    /// Ordinal rank used by the compatibility scorer.
    pub fn rank(&self) -> u8 {
        match self {
            DifficultyLevel::Beginner => 0,
            DifficultyLevel::Intermediate => 1,
            DifficultyLevel::Advanced => 2,
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        };
        write!(f, "{}", s)
    }
}

/// Aggregate: a recruitment post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Creating user
    pub owner_id: UserId,

    /// Short title
    pub title: String,

    /// Free-text description
    pub description: String,

    /// Optional goal statement
    pub goal: String,

    /// Skill tags a teammate must bring
    pub required_skills: Vec<String>,

    /// Skill tags that are nice to have
    pub preferred_skills: Vec<String>,

    /// Free-text project category, e.g. "web app"
    pub project_type: Option<String>,

    /// Expected contributor difficulty
    pub difficulty: Option<DifficultyLevel>,

    /// Role tags the project wants to fill
    pub looking_for: Vec<String>,

    /// Minimum viable team size
    pub team_size_min: u32,

    /// Maximum team size; recruiting stops when reached
    pub team_size_max: u32,

    /// Current team size including the owner
    pub member_count: u32,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// Stored embedding vector, `None` until generated
    pub embedding: Option<Vec<f32>>,

    /// Soft-delete flag; deleted projects never match
    pub is_deleted: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new recruiting project owned by `owner_id`.
    pub fn new(owner_id: UserId, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new_v4(),
            owner_id,
            title: title.into(),
            description: description.into(),
            goal: String::new(),
            required_skills: Vec::new(),
            preferred_skills: Vec::new(),
            project_type: None,
            difficulty: None,
            looking_for: Vec::new(),
            team_size_min: 1,
            team_size_max: 5,
            member_count: 1,
            status: ProjectStatus::Recruiting,
            embedding: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Text fed to the embedding provider. Deterministic for equal field
    /// values: the embedding cache is keyed off this string.
    pub fn text_representation(&self) -> String {
        let mut parts = Vec::new();
        if !self.title.trim().is_empty() {
            parts.push(format!("Title: {}", self.title));
        }
        if !self.description.trim().is_empty() {
            parts.push(format!("Description: {}", self.description));
        }
        if !self.goal.trim().is_empty() {
            parts.push(format!("Goal: {}", self.goal));
        }
        if !self.required_skills.is_empty() {
            parts.push(format!("Required Skills: {}", self.required_skills.join(", ")));
        }
        if !self.preferred_skills.is_empty() {
            parts.push(format!("Preferred Skills: {}", self.preferred_skills.join(", ")));
        }
        if let Some(project_type) = &self.project_type {
            if !project_type.trim().is_empty() {
                parts.push(format!("Type: {}", project_type));
            }
        }
        if let Some(difficulty) = self.difficulty {
            parts.push(format!("Difficulty: {}", difficulty));
        }
        if !self.looking_for.is_empty() {
            parts.push(format!("Looking for: {}", self.looking_for.join(", ")));
        }
        parts.join(" | ")
    }

    /// A project is recruiting while its status says so, it is not
    /// soft-deleted, and the team still has room.
    pub fn is_recruiting(&self) -> bool {
        self.status == ProjectStatus::Recruiting
            && !self.is_deleted
            && self.member_count < self.team_size_max
    }
}
