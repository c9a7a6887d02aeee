//!
//! Teammatch Core - domain model for the Teammatch engine
//!
//! This crate defines the entities the matching engine operates on
//! (profiles and projects), the repository traits the engine reads
//! through, and the pure compatibility scorer. It has no knowledge of
//! embeddings, vector indexes, or caches; those live in higher crates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Error types
pub mod error;

/// Typed identifiers for profiles, projects, and users
pub mod identifiers;

/// User profile aggregate
pub mod profile;

/// Project aggregate
pub mod project;

/// Repository traits and in-memory implementations
pub mod repository;

/// Rule-based compatibility scoring
pub mod scoring;

pub use error::StoreError;
pub use identifiers::{ProfileId, ProjectId, UserId};
pub use profile::{ExperienceLevel, Profile};
pub use project::{DifficultyLevel, Project, ProjectStatus};
pub use repository::{
    MemoryProfileRepository, MemoryProjectRepository, ProfileRepository, ProjectRepository,
};
pub use scoring::{score_compatibility, CompatibilityScore};
