//! Backend factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::Cache;
use crate::domain::notification::EventPublisher;
use crate::domain::DomainError;
use crate::infrastructure::connection::{RedisConnection, RedisConnectionFactory};
use crate::infrastructure::pubsub::{InMemoryPublisher, RedisPublisher};

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::RedisCache;

/// Endpoint used when none is configured
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";

/// Supported backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// Single-process backend using moka and in-process broadcast channels
    InMemory,
    #[default]
    Redis,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::InMemory => write!(f, "in_memory"),
            CacheType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(CacheType::InMemory),
            "redis" => Ok(CacheType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache type: {}. Valid types: in_memory, redis",
                s
            ))),
        }
    }
}

/// Configuration for the cache and notification backends
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub cache_type: CacheType,
    /// Single connection endpoint shared by the cache and the publisher
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,
    /// Maximum capacity (in-memory only)
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

fn default_redis_url() -> String {
    DEFAULT_REDIS_URL.to_string()
}

fn default_connection_timeout_secs() -> u64 {
    5
}

fn default_max_capacity() -> u64 {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::default(),
            redis_url: default_redis_url(),
            connection_timeout_secs: default_connection_timeout_secs(),
            max_capacity: default_max_capacity(),
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration for in-memory backends
    pub fn in_memory() -> Self {
        Self {
            cache_type: CacheType::InMemory,
            ..Default::default()
        }
    }

    /// Creates a new configuration for Redis backends
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            cache_type: CacheType::Redis,
            redis_url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Sets the maximum capacity (in-memory only)
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Creates config from `CACHE_TYPE`, `REDIS_URL`, `CACHE_CONNECTION_TIMEOUT_SECS`
    /// and `CACHE_MAX_CAPACITY`
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Creates config from a variable lookup; unset or unparsable numbers keep their defaults
    pub fn from_vars<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_type = match lookup("CACHE_TYPE") {
            Some(value) => value.parse()?,
            None => CacheType::default(),
        };

        let redis_url = lookup("REDIS_URL").unwrap_or_else(default_redis_url);

        let connection_timeout_secs = lookup("CACHE_CONNECTION_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_connection_timeout_secs);

        let max_capacity = lookup("CACHE_MAX_CAPACITY")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_capacity);

        Ok(Self {
            cache_type,
            redis_url,
            connection_timeout_secs,
            max_capacity,
        })
    }
}

/// Cache and publisher built over the same transport
#[derive(Debug, Clone)]
pub struct CacheBackends {
    pub cache: Arc<dyn Cache>,
    pub publisher: Arc<dyn EventPublisher>,
    /// Shared Redis connection; `None` for in-memory backends
    pub connection: Option<Arc<RedisConnection>>,
    /// Local broadcast hub; `None` for Redis backends
    pub local_publisher: Option<Arc<InMemoryPublisher>>,
}

/// Factory for creating backend instances
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    /// Creates a new cache factory
    pub fn new() -> Self {
        Self
    }

    /// Creates backends based on configuration
    ///
    /// Redis backends do not connect here; the shared connection is opened on
    /// first use. Only a malformed endpoint fails at this point.
    pub fn create(&self, config: &CacheConfig) -> Result<CacheBackends, DomainError> {
        match config.cache_type {
            CacheType::InMemory => {
                let cache = InMemoryCache::with_config(
                    InMemoryCacheConfig::default().with_max_capacity(config.max_capacity),
                );
                let publisher = Arc::new(InMemoryPublisher::new());

                Ok(CacheBackends {
                    cache: Arc::new(cache),
                    publisher: publisher.clone(),
                    connection: None,
                    local_publisher: Some(publisher),
                })
            }
            CacheType::Redis => {
                let connection = Arc::new(self.create_redis_connection(config)?);

                Ok(CacheBackends {
                    cache: Arc::new(RedisCache::new(connection.clone())),
                    publisher: Arc::new(RedisPublisher::new(connection.clone())),
                    connection: Some(connection),
                    local_publisher: None,
                })
            }
        }
    }

    /// Creates the lazily-initialized shared Redis connection
    pub fn create_redis_connection(
        &self,
        config: &CacheConfig,
    ) -> Result<RedisConnection, DomainError> {
        let factory =
            RedisConnectionFactory::new(&config.redis_url, config.connection_timeout())?;
        Ok(RedisConnection::new(factory))
    }
}
