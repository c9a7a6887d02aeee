//! Error types for the Teammatch domain layer

use thiserror::Error;

/// Errors surfaced by the repository boundary.
///
/// Repository failures are real errors: the matching layer degrades on
/// provider/index/cache trouble, but a broken store is not something it
/// papers over.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed entity does not exist.
    #[error("Entity not found: type={entity_type} id={id}")]
    NotFound {
        /// Entity kind, e.g. "profile" or "project".
        entity_type: String,
        /// Stringified identifier of the missing entity.
        id: String,
    },

    /// The backing store failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Helper to create a `NotFound` error.
    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Helper to create a `Backend` error.
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }
}
