//! Redis cache implementation

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::cache::Cache;
use crate::domain::DomainError;
use crate::infrastructure::connection::RedisConnection;

/// Keys requested per SCAN round trip
const SCAN_BATCH_SIZE: usize = 100;

/// Redis cache implementation
///
/// Every operation acquires the process-wide connection lazily, so a Redis
/// outage at startup only surfaces once the cache is actually used.
#[derive(Clone)]
pub struct RedisCache {
    connection: Arc<RedisConnection>,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("connection", &self.connection)
            .finish()
    }
}

impl RedisCache {
    pub fn new(connection: Arc<RedisConnection>) -> Self {
        Self { connection }
    }

    async fn conn(&self) -> Result<ConnectionManager, DomainError> {
        self.connection.acquire().await
    }

    /// Enumerates every key matching `pattern` with incremental SCAN
    async fn scan_keys(
        conn: &mut ConnectionManager,
        pattern: &str,
    ) -> Result<Vec<String>, DomainError> {
        // SCAN may return a key more than once across iterations
        let mut keys = BTreeSet::new();
        let mut cursor = 0u64;

        loop {
            let (new_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut *conn)
                .await
                .map_err(|e| {
                    DomainError::cache(format!(
                        "Failed to scan keys with pattern '{}': {}",
                        pattern, e
                    ))
                })?;

            keys.extend(batch);
            cursor = new_cursor;

            if cursor == 0 {
                break;
            }
        }

        Ok(keys.into_iter().collect())
    }
}

/// Redis expirations have whole-second granularity; never round down to zero
fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 { secs + 1 } else { secs.max(1) }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.conn().await?;

        let result: Option<String> = conn.get(key).await.map_err(|e| {
            DomainError::cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        Ok(result)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.conn().await?;

        let _: () = conn
            .set_ex(key, value, ttl_secs(ttl))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.conn().await?;

        let deleted: i64 = conn.del(key).await.map_err(|e| {
            DomainError::cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        Ok(deleted > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let mut conn = self.conn().await?;

        let keys = Self::scan_keys(&mut conn, pattern).await?;

        if keys.is_empty() {
            return Ok(0);
        }

        let deleted: i64 = conn.del(&keys).await.map_err(|e| {
            DomainError::cache(format!(
                "Failed to delete {} keys matching '{}': {}",
                keys.len(),
                pattern,
                e
            ))
        })?;

        Ok(usize::try_from(deleted).unwrap_or_default())
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.conn().await?;

        let exists: bool = conn.exists(key).await.map_err(|e| {
            DomainError::cache(format!("Failed to check existence of key '{}': {}", key, e))
        })?;

        Ok(exists)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        let mut conn = self.conn().await?;

        let remaining: i64 = conn.ttl(key).await.map_err(|e| {
            DomainError::cache(format!("Failed to get TTL for key '{}': {}", key, e))
        })?;

        // Redis returns -2 if key doesn't exist, -1 if no TTL
        Ok(u64::try_from(remaining).ok().map(Duration::from_secs))
    }

    async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.conn().await?;

        let response: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Redis ping failed: {}", e)))?;

        if response == "PONG" {
            Ok(())
        } else {
            Err(DomainError::cache(format!(
                "Unexpected ping response: {}",
                response
            )))
        }
    }
}
