//! Cache maintenance commands

use clap::Args;
use tracing::{info, warn};

use crate::domain::CatalogDomain;

/// Arguments for the invalidate command
#[derive(Args, Clone)]
pub struct InvalidateArgs {
    /// Catalog domain: products, categories, car_brands, car_models, product_brands
    #[arg(value_parser = parse_domain)]
    pub domain: CatalogDomain,
}

fn parse_domain(s: &str) -> Result<CatalogDomain, String> {
    s.parse().map_err(|e: crate::domain::DomainError| e.to_string())
}

/// Run the ping command
pub async fn ping() -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = super::cache_state(&config)?;

    let reachable = state.store.ping().await;
    state.shutdown().await;

    if !reachable {
        warn!(cache_type = %config.cache.cache_type, "Cache backend is unreachable");
        anyhow::bail!("cache backend is unreachable");
    }

    info!(cache_type = %config.cache.cache_type, "Cache backend is reachable");
    println!("PONG");

    Ok(())
}

/// Run the invalidate command
pub async fn invalidate(args: InvalidateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = super::cache_state(&config)?;

    let deleted = state.catalog.invalidate(args.domain).await;
    state.shutdown().await;

    println!("{} key(s) removed from {}", deleted, args.domain);

    Ok(())
}
