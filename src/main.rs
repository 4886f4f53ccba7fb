use catalog_cache::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Ping => cli::cache::ping().await,
        Command::Invalidate(args) => cli::cache::invalidate(args).await,
        Command::NotifyProduct(args) => cli::notify::product(args).await,
        Command::NotifyOrder(args) => cli::notify::order(args).await,
        Command::NotifySync(args) => cli::notify::sync(args).await,
        Command::Listen(args) => cli::listen::run(args).await,
    }
}
