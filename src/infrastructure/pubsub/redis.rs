//! Redis pub/sub transport for change events.
//!
//! Publishing reuses the shared multiplexed connection. Subscribing needs a
//! dedicated connection, since a connection in SUBSCRIBE mode cannot run
//! regular commands.

use std::fmt;
use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use redis::{AsyncCommands, Client};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::domain::notification::{ChangeEvent, Channel, EventPublisher};
use crate::domain::DomainError;
use crate::infrastructure::connection::RedisConnection;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Publishes change events with PUBLISH over the shared connection
#[derive(Clone)]
pub struct RedisPublisher {
    connection: Arc<RedisConnection>,
}

impl fmt::Debug for RedisPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisPublisher")
            .field("connection", &self.connection)
            .finish()
    }
}

impl RedisPublisher {
    pub fn new(connection: Arc<RedisConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl EventPublisher for RedisPublisher {
    async fn publish_raw(&self, channel: &str, payload: &str) -> Result<usize, DomainError> {
        let mut conn = self.connection.acquire().await?;

        let receivers: usize = conn.publish(channel, payload).await.map_err(|e| {
            DomainError::pubsub(format!("Failed to publish to '{}': {}", channel, e))
        })?;

        Ok(receivers)
    }
}

/// Receives change events published by other processes
///
/// Only messages published while the subscription is active are received;
/// anything published before `subscribe` returns, or during a reconnect, is lost.
pub struct RedisSubscriber {
    client: Client,
    channels: Vec<Channel>,
}

impl fmt::Debug for RedisSubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSubscriber")
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

impl RedisSubscriber {
    pub fn new(client: Client, channels: impl IntoIterator<Item = Channel>) -> Self {
        Self {
            client,
            channels: channels.into_iter().collect(),
        }
    }

    /// Builds a subscriber for an endpoint URL without connecting
    pub fn open(url: &str, channels: impl IntoIterator<Item = Channel>) -> Result<Self, DomainError> {
        let client = Client::open(url)
            .map_err(|e| DomainError::configuration(format!("Invalid Redis URL: {}", e)))?;

        Ok(Self::new(client, channels))
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Opens a dedicated pub/sub connection and subscribes to every channel
    ///
    /// Payloads that do not match their channel's schema are logged and skipped.
    pub async fn subscribe(&self) -> Result<impl Stream<Item = ChangeEvent>, DomainError> {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| DomainError::connection(format!("Failed to open pub/sub connection: {}", e)))?;

        for channel in &self.channels {
            pubsub.subscribe(channel.as_str()).await.map_err(|e| {
                DomainError::pubsub(format!("Failed to subscribe to '{}': {}", channel, e))
            })?;
        }

        info!(channels = ?self.channels, "Subscribed to change channels");

        let stream = pubsub.into_on_message().filter_map(|msg| async move {
            let channel = msg.get_channel_name().to_string();

            let payload: String = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(channel = %channel, error = %e, "Failed to read pub/sub payload");
                    return None;
                }
            };

            match ChangeEvent::decode(&channel, &payload) {
                Ok(event) => {
                    debug!(channel = %channel, "Received change event");
                    Some(event)
                }
                Err(e) => {
                    warn!(channel = %channel, error = %e, "Discarding malformed change event");
                    None
                }
            }
        });

        Ok(stream)
    }

    /// Forwards events to `handler` forever, reconnecting with exponential backoff
    pub async fn listen<F>(&self, handler: F)
    where
        F: FnMut(ChangeEvent),
    {
        resubscribe_forever(|| self.subscribe(), handler).await
    }
}

/// Drives `subscribe` in a loop, waiting out the backoff after every failure or closed stream
///
/// The backoff only resets once a subscription has delivered an event, so a
/// server that accepts SUBSCRIBE and drops the connection straight away is not
/// hammered.
async fn resubscribe_forever<S, Fut, St, F>(mut subscribe: S, mut handler: F)
where
    S: FnMut() -> Fut,
    Fut: Future<Output = Result<St, DomainError>>,
    St: Stream<Item = ChangeEvent>,
    F: FnMut(ChangeEvent),
{
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match subscribe().await {
            Ok(stream) => {
                let mut stream = pin!(stream);
                let mut delivered = false;

                while let Some(event) = stream.next().await {
                    delivered = true;
                    handler(event);
                }

                if delivered {
                    backoff = INITIAL_BACKOFF;
                }

                warn!(
                    backoff_secs = backoff.as_secs(),
                    "Pub/sub connection closed, resubscribing"
                );
            }
            Err(e) => {
                error!(
                    error = %e,
                    backoff_secs = backoff.as_secs(),
                    "Change subscription failed, reconnecting..."
                );
            }
        }

        sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}
