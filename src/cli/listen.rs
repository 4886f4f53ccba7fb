//! Listen command - prints change events until interrupted

use clap::Args;
use tokio::signal;
use tracing::{info, warn};

use crate::domain::{ChangeEvent, Channel, DomainError};
use crate::infrastructure::cache::CacheType;
use crate::infrastructure::pubsub::RedisSubscriber;

/// Arguments for the listen command
#[derive(Args, Clone)]
pub struct ListenArgs {
    /// Channels to follow (products, orders, sync); all when omitted
    #[arg(value_parser = parse_channel)]
    pub channels: Vec<Channel>,
}

impl ListenArgs {
    pub fn channels(&self) -> Vec<Channel> {
        if self.channels.is_empty() {
            Channel::ALL.to_vec()
        } else {
            self.channels.clone()
        }
    }
}

fn parse_channel(s: &str) -> Result<Channel, String> {
    s.parse().map_err(|e: DomainError| e.to_string())
}

/// Run the listen command
pub async fn run(args: ListenArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    if config.cache.cache_type != CacheType::Redis {
        anyhow::bail!("listen requires the redis backend; in-memory events never leave the process");
    }

    let subscriber = RedisSubscriber::open(&config.cache.redis_url, args.channels())?;
    info!(channels = ?subscriber.channels(), "Listening for change events");

    tokio::select! {
        _ = subscriber.listen(print_event) => {}
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl+C");
            }
            info!("Received Ctrl+C, stopping listener");
        }
    }

    Ok(())
}

fn print_event(event: ChangeEvent) {
    match event.to_payload() {
        Ok(payload) => println!("{} {}", event.channel(), payload),
        Err(e) => warn!(channel = %event.channel(), error = %e, "Failed to render change event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_accepts_short_and_full_names() {
        assert_eq!(parse_channel("orders").unwrap(), Channel::Orders);
        assert_eq!(parse_channel("channel:sync").unwrap(), Channel::Sync);
        assert!(parse_channel("carts").is_err());
    }
}
