//! Cache infrastructure - Cache implementations

mod factory;
mod in_memory;
mod redis;

pub use factory::{CacheBackends, CacheConfig, CacheFactory, CacheType, DEFAULT_REDIS_URL};
pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use self::redis::RedisCache;
