//! CLI module for the catalog cache
//!
//! Operational entry points around the shared cache:
//! - `ping`: check the backend answers
//! - `invalidate`: drop every cached key of a catalog domain
//! - `notify-*`: publish change events by hand
//! - `listen`: print change events as they arrive

pub mod cache;
pub mod listen;
pub mod notify;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::state::CacheState;

/// Catalog cache - Shared cache and change notifications for the parts catalog
#[derive(Parser)]
#[command(name = "catalog-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that the cache backend answers
    Ping,

    /// Drop every cached key of a catalog domain
    Invalidate(cache::InvalidateArgs),

    /// Publish a product change event
    NotifyProduct(notify::ProductArgs),

    /// Publish an order change event
    NotifyOrder(notify::OrderArgs),

    /// Announce that fresh data is available for sync
    NotifySync(notify::SyncArgs),

    /// Print change events until interrupted
    Listen(listen::ListenArgs),
}

/// Loads `.env` and configuration, then installs logging
///
/// Unreadable configuration files fall back to the `CACHE_*` variables.
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let (config, load_error) = AppConfig::load_or_env()?;
    logging::init_logging(&config.logging);

    if let Some(e) = load_error {
        warn!(error = %e, "Configuration files unreadable, using environment variables");
    }

    Ok(config)
}

/// Builds the cache state used by one-shot commands
pub(crate) fn cache_state(config: &AppConfig) -> anyhow::Result<CacheState> {
    Ok(CacheState::from_config(&config.cache)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CatalogDomain, Channel};
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_invalidate() {
        let cli = Cli::try_parse_from(["catalog-cache", "invalidate", "car-brands"]).unwrap();

        match cli.command {
            Command::Invalidate(args) => assert_eq!(args.domain, CatalogDomain::CarBrands),
            _ => panic!("expected invalidate"),
        }
    }

    #[test]
    fn test_parse_invalidate_rejects_unknown_domain() {
        let result = Cli::try_parse_from(["catalog-cache", "invalidate", "orders"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_notify_order() {
        let cli = Cli::try_parse_from([
            "catalog-cache",
            "notify-order",
            "o1",
            "shipped",
            "--user-id",
            "u1",
        ])
        .unwrap();

        match cli.command {
            Command::NotifyOrder(args) => {
                assert_eq!(args.order_id, "o1");
                assert_eq!(args.action, "shipped");
                assert_eq!(args.user_id.as_deref(), Some("u1"));
            }
            _ => panic!("expected notify-order"),
        }
    }

    #[test]
    fn test_parse_notify_sync_requires_tables() {
        assert!(Cli::try_parse_from(["catalog-cache", "notify-sync"]).is_err());

        let cli = Cli::try_parse_from(["catalog-cache", "notify-sync", "products", "categories"])
            .unwrap();
        match cli.command {
            Command::NotifySync(args) => assert_eq!(args.tables, ["products", "categories"]),
            _ => panic!("expected notify-sync"),
        }
    }

    #[test]
    fn test_parse_listen_defaults_to_all_channels() {
        let cli = Cli::try_parse_from(["catalog-cache", "listen"]).unwrap();
        match cli.command {
            Command::Listen(args) => assert_eq!(args.channels(), Channel::ALL.to_vec()),
            _ => panic!("expected listen"),
        }

        let cli = Cli::try_parse_from(["catalog-cache", "listen", "orders"]).unwrap();
        match cli.command {
            Command::Listen(args) => assert_eq!(args.channels(), vec![Channel::Orders]),
            _ => panic!("expected listen"),
        }
    }
}
