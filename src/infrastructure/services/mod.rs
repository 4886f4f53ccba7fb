//! Infrastructure services

mod cache_store;
mod catalog_cache;
mod change_notifier;

pub use cache_store::CacheStore;
pub use catalog_cache::CatalogCache;
pub use change_notifier::ChangeNotifier;
