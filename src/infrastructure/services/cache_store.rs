//! Best-effort cache primitives
//!
//! The cache is an accelerator, never a correctness dependency: every backend
//! failure is logged at warn level and degraded to the "absent" / `false` / `0`
//! sentinel of the operation. Callers cannot distinguish a miss from an outage.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::domain::cache::{Cache, CacheExt, CacheTtl};

/// Defensive get/set/delete over any [`Cache`] backend
#[derive(Debug, Clone)]
pub struct CacheStore {
    cache: Arc<dyn Cache>,
}

impl CacheStore {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    /// Returns the cached value, or `None` on a miss or any failure
    pub async fn get<V>(&self, key: &str) -> Option<V>
    where
        V: DeserializeOwned + Send,
    {
        match self.cache.get::<V>(key).await {
            Ok(Some(value)) => {
                counter!("catalog_cache_lookups_total", "outcome" => "hit").increment(1);
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            Ok(None) => {
                counter!("catalog_cache_lookups_total", "outcome" => "miss").increment(1);
                debug!(key = %key, "Cache miss");
                None
            }
            Err(e) => {
                record_fault("get");
                warn!(key = %key, error = %e, "Cache get error");
                None
            }
        }
    }

    /// Stores a value with the default (medium) TTL
    pub async fn set<V>(&self, key: &str, value: &V) -> bool
    where
        V: Serialize + Send + Sync + ?Sized,
    {
        self.set_with_ttl(key, value, CacheTtl::default()).await
    }

    /// Stores a value with an explicit TTL tier
    pub async fn set_with_ttl<V>(&self, key: &str, value: &V, ttl: CacheTtl) -> bool
    where
        V: Serialize + Send + Sync + ?Sized,
    {
        let ttl = ttl.as_duration();

        match self.cache.set(key, value, ttl).await {
            Ok(()) => {
                debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache set");
                true
            }
            Err(e) => {
                record_fault("set");
                warn!(key = %key, error = %e, "Cache set error");
                false
            }
        }
    }

    /// Removes a key; `true` means the backend accepted the command, not that the key existed
    pub async fn delete(&self, key: &str) -> bool {
        match self.cache.delete(key).await {
            Ok(existed) => {
                debug!(key = %key, existed, "Cache delete");
                true
            }
            Err(e) => {
                record_fault("delete");
                warn!(key = %key, error = %e, "Cache delete error");
                false
            }
        }
    }

    /// Removes every key matching a glob pattern and returns how many were removed
    ///
    /// Best-effort and not atomic: matching keys written while the scan runs may
    /// survive. A result of 0 covers both "nothing matched" and "the backend
    /// failed"; only the warn log tells them apart.
    pub async fn delete_pattern(&self, pattern: &str) -> usize {
        match self.cache.delete_pattern(pattern).await {
            Ok(deleted) => {
                counter!("catalog_cache_invalidated_keys_total").increment(deleted as u64);
                debug!(pattern = %pattern, deleted, "Cache pattern delete");
                deleted
            }
            Err(e) => {
                record_fault("delete_pattern");
                warn!(pattern = %pattern, error = %e, "Cache delete pattern error");
                0
            }
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        match self.cache.exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                record_fault("exists");
                warn!(key = %key, error = %e, "Cache exists error");
                false
            }
        }
    }

    /// Remaining lifetime of a key, `None` when absent or on failure
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        match self.cache.ttl(key).await {
            Ok(ttl) => ttl,
            Err(e) => {
                record_fault("ttl");
                warn!(key = %key, error = %e, "Cache ttl error");
                None
            }
        }
    }

    /// Whether the backend currently answers
    pub async fn ping(&self) -> bool {
        match self.cache.ping().await {
            Ok(()) => true,
            Err(e) => {
                record_fault("ping");
                warn!(error = %e, "Cache ping error");
                false
            }
        }
    }
}

fn record_fault(operation: &'static str) {
    counter!("catalog_cache_faults_total", "operation" => operation).increment(1);
}
