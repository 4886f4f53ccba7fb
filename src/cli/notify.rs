//! Manual change notifications

use clap::Args;

/// Arguments for the notify-product command
#[derive(Args, Clone)]
pub struct ProductArgs {
    pub product_id: String,

    /// What happened, e.g. created, updated, deleted
    pub action: String,
}

/// Arguments for the notify-order command
#[derive(Args, Clone)]
pub struct OrderArgs {
    pub order_id: String,

    /// What happened, e.g. created, paid, shipped
    pub action: String,

    /// Owner of the order
    #[arg(long)]
    pub user_id: Option<String>,
}

/// Arguments for the notify-sync command
#[derive(Args, Clone)]
pub struct SyncArgs {
    /// Tables with fresh data
    #[arg(required = true)]
    pub tables: Vec<String>,
}

pub async fn product(args: ProductArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = super::cache_state(&config)?;

    state
        .notifier
        .notify_product_change(&args.product_id, &args.action)
        .await;
    state.shutdown().await;

    Ok(())
}

pub async fn order(args: OrderArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = super::cache_state(&config)?;

    state
        .notifier
        .notify_order_change(&args.order_id, &args.action, args.user_id.as_deref())
        .await;
    state.shutdown().await;

    Ok(())
}

pub async fn sync(args: SyncArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = super::cache_state(&config)?;

    state.notifier.notify_sync_available(args.tables).await;
    state.shutdown().await;

    Ok(())
}
