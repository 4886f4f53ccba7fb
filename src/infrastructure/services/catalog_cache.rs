//! Catalog cache service
//!
//! Maps catalog listings, the category tree, per-user state and sync watermarks
//! onto namespaced keys and TTL tiers. There is no write-through: callers write
//! the primary store first and then invalidate the affected domain here.
//!
//! Catalog setters take an optional TTL; `None` keeps the long tier.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use crate::domain::cache::{sync_timestamp_key, CacheNamespace, CacheTtl, CatalogDomain, TREE_SUFFIX};
use crate::infrastructure::services::CacheStore;

/// Domain-level cache operations for the parts catalog
#[derive(Debug, Clone)]
pub struct CatalogCache {
    store: CacheStore,
}

impl CatalogCache {
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    /// Underlying store, for ad-hoc keys
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    // Generic listing operations

    /// Full listing of a domain, `None` on miss
    pub async fn get_all<T>(&self, domain: CatalogDomain) -> Option<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.store.get(&domain.all_key()).await
    }

    /// Caches the full listing of a domain, preserving order
    pub async fn set_all<T>(&self, domain: CatalogDomain, items: &[T], ttl: CacheTtl) -> bool
    where
        T: Serialize + Send + Sync,
    {
        self.store.set_with_ttl(&domain.all_key(), items, ttl).await
    }

    /// Drops every key of a domain, listing and single entities alike
    pub async fn invalidate(&self, domain: CatalogDomain) -> usize {
        let deleted = self.store.delete_pattern(&domain.namespace().pattern()).await;
        info!(domain = %domain, deleted, "Invalidated catalog cache");
        deleted
    }

    // Products

    pub async fn get_all_products<T>(&self) -> Option<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.get_all(CatalogDomain::Products).await
    }

    pub async fn set_all_products<T>(&self, products: &[T], ttl: Option<CacheTtl>) -> bool
    where
        T: Serialize + Send + Sync,
    {
        self.set_all(CatalogDomain::Products, products, ttl.unwrap_or(CacheTtl::Long))
            .await
    }

    pub async fn get_product<T>(&self, product_id: &str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        self.store.get(&CacheNamespace::Products.key(product_id)).await
    }

    pub async fn set_product<T>(&self, product_id: &str, product: &T, ttl: Option<CacheTtl>) -> bool
    where
        T: Serialize + Send + Sync,
    {
        let key = CacheNamespace::Products.key(product_id);
        self.store
            .set_with_ttl(&key, product, ttl.unwrap_or(CacheTtl::Long))
            .await
    }

    pub async fn invalidate_products(&self) -> usize {
        self.invalidate(CatalogDomain::Products).await
    }

    // Categories

    pub async fn get_all_categories<T>(&self) -> Option<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.get_all(CatalogDomain::Categories).await
    }

    pub async fn set_all_categories<T>(&self, categories: &[T], ttl: Option<CacheTtl>) -> bool
    where
        T: Serialize + Send + Sync,
    {
        self.set_all(CatalogDomain::Categories, categories, ttl.unwrap_or(CacheTtl::Long))
            .await
    }

    /// Nested category hierarchy, kept apart from the flat listing
    pub async fn get_categories_tree<T>(&self) -> Option<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.store.get(&CacheNamespace::Categories.key(TREE_SUFFIX)).await
    }

    pub async fn set_categories_tree<T>(&self, tree: &[T], ttl: Option<CacheTtl>) -> bool
    where
        T: Serialize + Send + Sync,
    {
        let key = CacheNamespace::Categories.key(TREE_SUFFIX);
        self.store
            .set_with_ttl(&key, tree, ttl.unwrap_or(CacheTtl::Long))
            .await
    }

    pub async fn invalidate_categories(&self) -> usize {
        self.invalidate(CatalogDomain::Categories).await
    }

    // Car brands

    pub async fn get_all_car_brands<T>(&self) -> Option<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.get_all(CatalogDomain::CarBrands).await
    }

    pub async fn set_all_car_brands<T>(&self, brands: &[T], ttl: Option<CacheTtl>) -> bool
    where
        T: Serialize + Send + Sync,
    {
        self.set_all(CatalogDomain::CarBrands, brands, ttl.unwrap_or(CacheTtl::Long))
            .await
    }

    pub async fn invalidate_car_brands(&self) -> usize {
        self.invalidate(CatalogDomain::CarBrands).await
    }

    // Car models

    pub async fn get_all_car_models<T>(&self) -> Option<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.get_all(CatalogDomain::CarModels).await
    }

    pub async fn set_all_car_models<T>(&self, models: &[T], ttl: Option<CacheTtl>) -> bool
    where
        T: Serialize + Send + Sync,
    {
        self.set_all(CatalogDomain::CarModels, models, ttl.unwrap_or(CacheTtl::Long))
            .await
    }

    pub async fn invalidate_car_models(&self) -> usize {
        self.invalidate(CatalogDomain::CarModels).await
    }

    // Product brands

    pub async fn get_all_product_brands<T>(&self) -> Option<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.get_all(CatalogDomain::ProductBrands).await
    }

    pub async fn set_all_product_brands<T>(&self, brands: &[T], ttl: Option<CacheTtl>) -> bool
    where
        T: Serialize + Send + Sync,
    {
        self.set_all(CatalogDomain::ProductBrands, brands, ttl.unwrap_or(CacheTtl::Long))
            .await
    }

    pub async fn invalidate_product_brands(&self) -> usize {
        self.invalidate(CatalogDomain::ProductBrands).await
    }

    // Sync watermarks

    /// Unix timestamp of the last completed sync of `table`
    pub async fn get_last_sync_timestamp(&self, table: &str) -> Option<i64> {
        self.store.get(&sync_timestamp_key(table)).await
    }

    /// Records a sync watermark; always kept for the long tier
    pub async fn set_last_sync_timestamp(&self, table: &str, timestamp: i64) -> bool {
        self.store
            .set_with_ttl(&sync_timestamp_key(table), &timestamp, CacheTtl::Long)
            .await
    }

    /// Records the current time as the watermark of `table` and returns it
    pub async fn touch_sync_timestamp(&self, table: &str) -> Option<i64> {
        let now = Utc::now().timestamp();

        self.set_last_sync_timestamp(table, now)
            .await
            .then_some(now)
    }

    // Per-user state

    pub async fn get_user_session<T>(&self, user_id: &str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        self.store.get(&CacheNamespace::User.key(user_id)).await
    }

    pub async fn set_user_session<T>(&self, user_id: &str, session: &T) -> bool
    where
        T: Serialize + Send + Sync,
    {
        self.store
            .set_with_ttl(&CacheNamespace::User.key(user_id), session, CacheTtl::Medium)
            .await
    }

    pub async fn invalidate_user_session(&self, user_id: &str) -> bool {
        self.store.delete(&CacheNamespace::User.key(user_id)).await
    }

    /// Carts change often, so they only live for the short tier
    pub async fn get_cart<T>(&self, user_id: &str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        self.store.get(&CacheNamespace::Cart.key(user_id)).await
    }

    pub async fn set_cart<T>(&self, user_id: &str, cart: &T) -> bool
    where
        T: Serialize + Send + Sync,
    {
        self.store
            .set_with_ttl(&CacheNamespace::Cart.key(user_id), cart, CacheTtl::Short)
            .await
    }

    pub async fn invalidate_cart(&self, user_id: &str) -> bool {
        self.store.delete(&CacheNamespace::Cart.key(user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::infrastructure::cache::InMemoryCache;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct CarBrand {
        id: String,
        name: String,
    }

    fn brands() -> Vec<CarBrand> {
        ["Toyota", "BMW", "Audi"]
            .iter()
            .enumerate()
            .map(|(i, name)| CarBrand {
                id: format!("b{}", i + 1),
                name: name.to_string(),
            })
            .collect()
    }

    fn in_memory_catalog() -> CatalogCache {
        CatalogCache::new(CacheStore::new(Arc::new(InMemoryCache::new())))
    }

    fn mock_catalog() -> (Arc<MockCache>, CatalogCache) {
        let cache = Arc::new(MockCache::new());
        let catalog = CatalogCache::new(CacheStore::new(cache.clone()));
        (cache, catalog)
    }

    #[tokio::test]
    async fn test_car_brands_order_key_and_ttl() {
        let (cache, catalog) = mock_catalog();

        assert!(catalog.set_all_car_brands(&brands(), None).await);

        let cached: Option<Vec<CarBrand>> = catalog.get_all_car_brands().await;
        assert_eq!(cached, Some(brands()));
        assert!(cache.raw("car_brands:all").is_some());
        assert_eq!(
            catalog.store().ttl("car_brands:all").await,
            Some(Duration::from_secs(3600))
        );
    }

    #[tokio::test]
    async fn test_car_brands_ttl_on_live_backend() {
        let catalog = in_memory_catalog();

        catalog.set_all_car_brands(&brands(), None).await;

        let ttl = catalog.store().ttl("car_brands:all").await.unwrap();
        assert!(ttl > Duration::from_secs(3590) && ttl <= Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_invalidate_products_leaves_other_domains() {
        let catalog = in_memory_catalog();

        catalog.set_all_products(&[json!({"id": "1"}), json!({"id": "2"})], None).await;
        catalog.set_product("1", &json!({"id": "1"}), None).await;
        catalog.set_product("2", &json!({"id": "2"}), None).await;
        catalog.set_categories_tree(&[json!({"id": "c1", "children": []})], None).await;

        assert_eq!(catalog.invalidate_products().await, 3);

        let all: Option<Vec<serde_json::Value>> = catalog.get_all_products().await;
        assert!(all.is_none());
        let single: Option<serde_json::Value> = catalog.get_product("1").await;
        assert!(single.is_none());
        let tree: Option<Vec<serde_json::Value>> = catalog.get_categories_tree().await;
        assert!(tree.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_empty_domain_returns_zero() {
        let catalog = in_memory_catalog();

        assert_eq!(catalog.invalidate_car_models().await, 0);
    }

    #[tokio::test]
    async fn test_categories_tree_is_part_of_categories_domain() {
        let catalog = in_memory_catalog();

        catalog.set_all_categories(&[json!({"id": "c1"})], None).await;
        catalog.set_categories_tree(&[json!({"id": "c1", "children": []})], None).await;

        assert_eq!(catalog.invalidate_categories().await, 2);
    }

    #[tokio::test]
    async fn test_listing_keys() {
        let (cache, catalog) = mock_catalog();

        catalog.set_all_categories(&[1], None).await;
        catalog.set_all_car_models(&[1], None).await;
        catalog.set_all_product_brands(&[1], None).await;

        assert!(cache.raw("categories:all").is_some());
        assert!(cache.raw("car_models:all").is_some());
        assert!(cache.raw("product_brands:all").is_some());
    }

    #[tokio::test]
    async fn test_setters_default_to_long_and_accept_overrides() {
        let (_, catalog) = mock_catalog();

        catalog.set_product("1", &json!({"id": "1"}), None).await;
        catalog
            .set_product("2", &json!({"id": "2"}), Some(CacheTtl::Short))
            .await;
        catalog
            .set_categories_tree(&[json!({"id": "c1"})], Some(CacheTtl::from_secs(90)))
            .await;
        catalog
            .set_all_car_models(&["Corolla"], Some(CacheTtl::Medium))
            .await;

        let store = catalog.store();
        assert_eq!(store.ttl("products:1").await, Some(Duration::from_secs(3600)));
        assert_eq!(store.ttl("products:2").await, Some(Duration::from_secs(60)));
        assert_eq!(store.ttl("categories:tree").await, Some(Duration::from_secs(90)));
        assert_eq!(store.ttl("car_models:all").await, Some(Duration::from_secs(300)));
    }

    #[tokio::test]
    async fn test_generic_set_all_honors_ttl_override() {
        let (_, catalog) = mock_catalog();

        catalog
            .set_all(CatalogDomain::ProductBrands, &["Bosch"], CacheTtl::Short)
            .await;

        assert_eq!(
            catalog.store().ttl("product_brands:all").await,
            Some(Duration::from_secs(60))
        );
        let cached: Option<Vec<String>> = catalog.get_all(CatalogDomain::ProductBrands).await;
        assert_eq!(cached, Some(vec!["Bosch".to_string()]));
    }

    #[tokio::test]
    async fn test_sync_timestamp() {
        let (cache, catalog) = mock_catalog();

        assert!(catalog.get_last_sync_timestamp("products").await.is_none());
        assert!(catalog.set_last_sync_timestamp("products", 1_714_566_600).await);

        assert_eq!(
            catalog.get_last_sync_timestamp("products").await,
            Some(1_714_566_600)
        );
        assert_eq!(cache.raw("sync:timestamp:products"), Some("1714566600".to_string()));
        assert_eq!(
            catalog.store().ttl("sync:timestamp:products").await,
            Some(Duration::from_secs(3600))
        );
    }

    #[tokio::test]
    async fn test_touch_sync_timestamp() {
        let (_, catalog) = mock_catalog();
        let before = Utc::now().timestamp();

        let touched = catalog.touch_sync_timestamp("orders").await.unwrap();

        assert!(touched >= before);
        assert_eq!(catalog.get_last_sync_timestamp("orders").await, Some(touched));
    }

    #[tokio::test]
    async fn test_user_session_and_cart_tiers() {
        let (cache, catalog) = mock_catalog();

        catalog.set_user_session("u1", &json!({"name": "Ana"})).await;
        catalog.set_cart("u1", &json!({"items": []})).await;

        assert!(cache.raw("user:u1").is_some());
        assert_eq!(catalog.store().ttl("user:u1").await, Some(Duration::from_secs(300)));
        assert_eq!(catalog.store().ttl("cart:u1").await, Some(Duration::from_secs(60)));

        assert!(catalog.invalidate_cart("u1").await);
        let cart: Option<serde_json::Value> = catalog.get_cart("u1").await;
        assert!(cart.is_none());

        assert!(catalog.invalidate_user_session("u1").await);
        let session: Option<serde_json::Value> = catalog.get_user_session("u1").await;
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_is_a_miss() {
        let catalog =
            CatalogCache::new(CacheStore::new(Arc::new(MockCache::new().with_error("down"))));

        let products: Option<Vec<serde_json::Value>> = catalog.get_all_products().await;
        assert!(products.is_none());
        assert!(!catalog.set_all_products(&[json!({"id": "1"})], None).await);
        assert_eq!(catalog.invalidate_products().await, 0);
        assert!(catalog.touch_sync_timestamp("products").await.is_none());
    }
}
