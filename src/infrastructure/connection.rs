//! Shared backing-store connection with initialize-once semantics

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::Client;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::domain::DomainError;

/// How long a failed connect is reported to later callers without retrying
pub const DEFAULT_RETRY_COOLDOWN: Duration = Duration::from_secs(1);

/// Builds the underlying connection on first use
#[async_trait]
pub trait ConnectionFactory: Send + Sync + fmt::Debug {
    /// Cloneable handle; every clone shares the same underlying transport
    type Connection: Clone + Send + Sync + 'static;

    async fn connect(&self) -> Result<Self::Connection, DomainError>;
}

/// Outcome of the most recent failed connect
#[derive(Debug)]
struct ConnectFailure {
    at: Instant,
    message: String,
}

/// Single shared connection, created lazily and torn down explicitly
///
/// At most one connect runs at a time. Callers that queued behind a failed
/// attempt get that attempt's error instead of trying again one after another,
/// and for `retry_cooldown` after a failure every caller fails immediately.
/// Operations run on a cloned handle and never hold a lock while talking to
/// the store.
pub struct SharedConnection<F: ConnectionFactory> {
    factory: F,
    slot: RwLock<Option<F::Connection>>,
    init: Mutex<Option<ConnectFailure>>,
    attempts: AtomicU64,
    retry_cooldown: Duration,
}

impl<F: ConnectionFactory> fmt::Debug for SharedConnection<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedConnection")
            .field("factory", &self.factory)
            .field("retry_cooldown", &self.retry_cooldown)
            .finish_non_exhaustive()
    }
}

impl<F: ConnectionFactory> SharedConnection<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            slot: RwLock::new(None),
            init: Mutex::new(None),
            attempts: AtomicU64::new(0),
            retry_cooldown: DEFAULT_RETRY_COOLDOWN,
        }
    }

    pub fn with_retry_cooldown(mut self, cooldown: Duration) -> Self {
        self.retry_cooldown = cooldown;
        self
    }

    /// Returns the shared connection, constructing it if none exists
    pub async fn acquire(&self) -> Result<F::Connection, DomainError> {
        if let Some(connection) = self.current().await {
            return Ok(connection);
        }

        let observed = self.attempts.load(Ordering::SeqCst);
        let mut last_failure = self.init.lock().await;

        // Another caller may have finished initializing while we waited
        if let Some(connection) = self.current().await {
            return Ok(connection);
        }

        if let Some(failure) = last_failure.as_ref() {
            let attempted_while_waiting = self.attempts.load(Ordering::SeqCst) != observed;

            if attempted_while_waiting || failure.at.elapsed() < self.retry_cooldown {
                return Err(DomainError::connection(failure.message.clone()));
            }
        }

        self.attempts.fetch_add(1, Ordering::SeqCst);
        debug!(factory = ?self.factory, "Initializing shared connection");

        match self.factory.connect().await {
            Ok(connection) => {
                *self.slot.write().await = Some(connection.clone());
                *last_failure = None;
                Ok(connection)
            }
            Err(e) => {
                warn!(error = %e, "Shared connection could not be established");
                *last_failure = Some(ConnectFailure {
                    at: Instant::now(),
                    message: match &e {
                        DomainError::Connection { message } => message.clone(),
                        other => other.to_string(),
                    },
                });
                Err(e)
            }
        }
    }

    async fn current(&self) -> Option<F::Connection> {
        self.slot.read().await.clone()
    }

    /// Drops the shared connection so the next `acquire` re-initializes; no-op when absent
    pub async fn release(&self) {
        if self.slot.write().await.take().is_some() {
            info!("Shared connection released");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.slot.read().await.is_some()
    }
}

/// Opens multiplexed Redis connections that reconnect on their own after drops
#[derive(Clone)]
pub struct RedisConnectionFactory {
    client: Client,
    connection_timeout: Duration,
}

impl fmt::Debug for RedisConnectionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.client.get_connection_info();
        f.debug_struct("RedisConnectionFactory")
            .field("addr", &info.addr.to_string())
            .field("db", &info.redis.db)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

impl RedisConnectionFactory {
    /// Validates the endpoint without connecting
    pub fn new(url: &str, connection_timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::open(url)
            .map_err(|e| DomainError::configuration(format!("Invalid Redis URL: {}", e)))?;

        Ok(Self {
            client,
            connection_timeout,
        })
    }

    /// Single attempt bounded by the connect timeout; retries belong to the caller
    fn manager_config(&self) -> ConnectionManagerConfig {
        ConnectionManagerConfig::new()
            .set_number_of_retries(0)
            .set_connection_timeout(self.connection_timeout)
    }
}

#[async_trait]
impl ConnectionFactory for RedisConnectionFactory {
    type Connection = ConnectionManager;

    async fn connect(&self) -> Result<ConnectionManager, DomainError> {
        let connection = tokio::time::timeout(
            self.connection_timeout,
            ConnectionManager::new_with_config(self.client.clone(), self.manager_config()),
        )
        .await
        .map_err(|_| {
            DomainError::connection(format!(
                "Timed out connecting to Redis after {:?}",
                self.connection_timeout
            ))
        })?
        .map_err(|e| DomainError::connection(format!("Failed to connect to Redis: {}", e)))?;

        info!(addr = %self.client.get_connection_info().addr, "Redis connection established");
        Ok(connection)
    }
}

/// Process-wide Redis connection shared by the cache and the publisher
pub type RedisConnection = SharedConnection<RedisConnectionFactory>;
