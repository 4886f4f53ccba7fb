//! Cache domain - Namespaced keys, TTL tiers and the backend abstraction

mod key;
mod repository;
mod ttl;

pub use key::{
    glob_to_regex, sync_timestamp_key, CacheNamespace, CatalogDomain, ALL_SUFFIX, TREE_SUFFIX,
};
pub use repository::{Cache, CacheExt};
pub use ttl::CacheTtl;

#[cfg(test)]
pub use repository::mock::MockCache;
