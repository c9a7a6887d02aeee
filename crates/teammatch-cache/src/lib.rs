//! Teammatch Cache
//!
//! Key/value cache boundary for the matching engine. Everything above this
//! crate treats caching as best-effort: a failing `get` is a miss, a
//! failing `set` or `delete` is logged and ignored, and correctness never
//! depends on an entry being present.
//!
//! The `keys` module owns the key families and TTL policy so that embed,
//! compatibility, and match-result entries never collide and can be
//! invalidated independently.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub mod keys;
pub mod memory;

pub use memory::{CacheMetrics, MemoryCache};

/// Errors surfaced by cache implementations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache backend failed or is unreachable.
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// A cached value could not be serialized or deserialized.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Helper to create a `Backend` error.
    pub fn backend(message: impl Into<String>) -> Self {
        CacheError::Backend(message.into())
    }
}

/// Key/value store with per-entry TTL.
///
/// Implementations must expire entries no later than their TTL on read;
/// eager expiry is allowed. `delete_pattern` supports a single `*`
/// wildcard anywhere in the pattern, which is the only form the engine
/// emits (see [`keys`]).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store `value` under `key` for at most `ttl`.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a single entry. Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every entry matching `pattern` (one `*` wildcard).
    /// Returns the number of entries removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError>;
}
