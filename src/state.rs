//! Process-wide cache state shared by request handlers

use std::sync::Arc;

use tracing::info;

use crate::domain::DomainError;
use crate::infrastructure::cache::{CacheConfig, CacheFactory};
use crate::infrastructure::connection::RedisConnection;
use crate::infrastructure::pubsub::InMemoryPublisher;
use crate::infrastructure::services::{CacheStore, CatalogCache, ChangeNotifier};

/// Cache facade, notifier and the connection they share
///
/// Cheap to clone; every clone talks to the same backend.
#[derive(Debug, Clone)]
pub struct CacheState {
    pub store: CacheStore,
    pub catalog: CatalogCache,
    pub notifier: ChangeNotifier,
    connection: Option<Arc<RedisConnection>>,
    local_publisher: Option<Arc<InMemoryPublisher>>,
}

impl CacheState {
    /// Wires the services over the configured backend without connecting
    pub fn from_config(config: &CacheConfig) -> Result<Self, DomainError> {
        let backends = CacheFactory::new().create(config)?;
        let store = CacheStore::new(backends.cache);

        info!(cache_type = %config.cache_type, "Cache state created");

        Ok(Self {
            catalog: CatalogCache::new(store.clone()),
            store,
            notifier: ChangeNotifier::new(backends.publisher),
            connection: backends.connection,
            local_publisher: backends.local_publisher,
        })
    }

    /// Shared Redis connection, if the backend uses one
    pub fn connection(&self) -> Option<&Arc<RedisConnection>> {
        self.connection.as_ref()
    }

    /// In-process broadcast hub, if the backend is in-memory
    pub fn local_publisher(&self) -> Option<&Arc<InMemoryPublisher>> {
        self.local_publisher.as_ref()
    }

    /// Releases the shared connection; later use reconnects lazily
    pub async fn shutdown(&self) {
        if let Some(connection) = &self.connection {
            connection.release().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_state() {
        let state = CacheState::from_config(&CacheConfig::in_memory()).unwrap();

        assert!(state.connection().is_none());
        assert!(state.local_publisher().is_some());
        assert!(state.store.ping().await);

        assert!(state.catalog.set_all_car_brands(&["Toyota"], None).await);
        let cached: Option<Vec<String>> = state.store.get("car_brands:all").await;
        assert_eq!(cached, Some(vec!["Toyota".to_string()]));
    }

    #[tokio::test]
    async fn test_in_memory_notifier_reaches_local_subscribers() {
        let state = CacheState::from_config(&CacheConfig::in_memory()).unwrap();
        let mut rx = state
            .local_publisher()
            .unwrap()
            .subscribe("channel:sync");

        state.notifier.notify_sync_available(["products"]).await;

        assert_eq!(
            rx.recv().await.unwrap(),
            r#"{"tables":["products"],"action":"sync_available"}"#
        );
    }

    #[tokio::test]
    async fn test_redis_state_is_lazy() {
        let state = CacheState::from_config(&CacheConfig::redis("redis://127.0.0.1:1/0")).unwrap();
        let connection = state.connection().unwrap();

        assert!(!connection.is_connected().await);
        state.shutdown().await;
        assert!(!connection.is_connected().await);
    }

    #[test]
    fn test_invalid_url_fails_fast() {
        let result = CacheState::from_config(&CacheConfig::redis("not a url"));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
