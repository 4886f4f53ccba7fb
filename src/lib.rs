//! Catalog cache
//!
//! Shared caching and change-notification layer for the parts catalog:
//! - Namespaced keys with tiered expirations (60s / 300s / 3600s)
//! - Pattern-based bulk invalidation per catalog domain
//! - Fire-and-forget change events over pub/sub channels
//! - Redis or in-memory backends behind the same traits
//!
//! The cache is best-effort: an unreachable backend degrades every read to a
//! miss and every write to a no-op, never to an error.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod state;

pub use config::AppConfig;
pub use infrastructure::services::{CacheStore, CatalogCache, ChangeNotifier};
pub use state::CacheState;
