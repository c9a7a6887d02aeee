//! Error types for the engine crate.

use teammatch_core::StoreError;
use thiserror::Error;

/// Result alias used across the engine crate.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the engine's fallible boundaries.
///
/// Best-effort paths (cache traffic, optional providers) absorb their own
/// failures and log them; these variants cover the calls whose failure the
/// caller must see.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The embedding provider request failed or returned an invalid payload.
    #[error("Embedding provider error: {0}")]
    Provider(String),

    /// The vector index request failed or returned an invalid payload.
    #[error("Vector index error: {0}")]
    Index(String),

    /// A repository operation failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request did not complete within its deadline.
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl EngineError {
    /// Helper to create a `Provider` error.
    pub fn provider(message: impl Into<String>) -> Self {
        EngineError::Provider(message.into())
    }

    /// Helper to create an `Index` error.
    pub fn index(message: impl Into<String>) -> Self {
        EngineError::Index(message.into())
    }

    /// Helper to create a `Config` error.
    pub fn config(message: impl Into<String>) -> Self {
        EngineError::Config(message.into())
    }
}
