//! Domain layer - Cache keys, TTL tiers, change events and backend traits

pub mod cache;
pub mod error;
pub mod notification;

pub use cache::{Cache, CacheExt, CacheNamespace, CacheTtl, CatalogDomain};
pub use error::DomainError;
pub use notification::{
    ChangeEvent, Channel, EventPublisher, OrderChanged, ProductChanged, SyncAvailable,
};
