//! In-memory TTL cache.
//!
//! Backs tests and single-process deployments. Entries expire lazily on
//! read; writes sweep the whole map at most once per sweep interval so a
//! write-heavy workload does not accumulate dead entries forever.

use crate::{CacheError, CacheStore};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Cache metrics snapshot.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    /// Number of live items at snapshot time
    pub item_count: usize,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses (including expired reads)
    pub misses: u64,
    /// Number of entries dropped because their TTL passed
    pub expirations: u64,
    /// Hit ratio (hits / (hits + misses))
    pub hit_ratio: f64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: u64,
    misses: u64,
    expirations: u64,
}

/// In-memory [`CacheStore`] with per-entry TTL.
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    counters: Mutex<Counters>,
    sweep_interval: Duration,
    last_sweep: Mutex<Instant>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// Create an empty cache with the default sweep interval.
    pub fn new() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }

    /// Create an empty cache sweeping expired entries on writes at most
    /// once per `sweep_interval`.
    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            counters: Mutex::new(Counters::default()),
            sweep_interval,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Snapshot the cache counters.
    pub async fn metrics(&self) -> CacheMetrics {
        let item_count = self.entries.read().await.len();
        let counters = self.counters.lock().await;
        let lookups = counters.hits + counters.misses;
        CacheMetrics {
            item_count,
            hits: counters.hits,
            misses: counters.misses,
            expirations: counters.expirations,
            hit_ratio: if lookups == 0 {
                0.0
            } else {
                counters.hits as f64 / lookups as f64
            },
        }
    }

    async fn sweep_if_due(&self) {
        {
            let mut last_sweep = self.last_sweep.lock().await;
            if last_sweep.elapsed() < self.sweep_interval {
                return;
            }
            *last_sweep = Instant::now();
        }

        let removed = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired());
            before - entries.len()
        };
        if removed > 0 {
            debug!(removed, "swept expired cache entries");
            self.counters.lock().await.expirations += removed as u64;
        }
    }

    /// Split a pattern around its single `*` wildcard.
    fn split_pattern(pattern: &str) -> (String, Option<String>) {
        match pattern.split_once('*') {
            Some((prefix, suffix)) => (prefix.to_string(), Some(suffix.to_string())),
            None => (pattern.to_string(), None),
        }
    }

    fn matches(key: &str, prefix: &str, suffix: &Option<String>) -> bool {
        match suffix {
            Some(suffix) => {
                key.len() >= prefix.len() + suffix.len()
                    && key.starts_with(prefix)
                    && key.ends_with(suffix.as_str())
            }
            None => key == prefix,
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        enum Lookup {
            Hit(Value),
            Expired,
            Missing,
        }

        let outcome = {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => Lookup::Hit(entry.value.clone()),
                Some(_) => Lookup::Expired,
                None => Lookup::Missing,
            }
        };

        match outcome {
            Lookup::Hit(value) => {
                self.counters.lock().await.hits += 1;
                Ok(Some(value))
            }
            Lookup::Expired => {
                let removed = {
                    let mut entries = self.entries.write().await;
                    // Re-check under the write lock: a concurrent set may
                    // have replaced the entry since the read.
                    if entries.get(key).is_some_and(|e| e.is_expired()) {
                        entries.remove(key);
                        true
                    } else {
                        false
                    }
                };
                let mut counters = self.counters.lock().await;
                if removed {
                    counters.expirations += 1;
                }
                counters.misses += 1;
                Ok(None)
            }
            Lookup::Missing => {
                self.counters.lock().await.misses += 1;
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        self.sweep_if_due().await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|entry| !entry.is_expired()))
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let (prefix, suffix) = Self::split_pattern(pattern);
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !Self::matches(key, &prefix, &suffix));
        Ok((before - entries.len()) as u64)
    }
}
