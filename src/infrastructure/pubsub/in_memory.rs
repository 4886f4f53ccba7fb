//! In-process pub/sub using tokio broadcast channels

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::notification::EventPublisher;
use crate::domain::DomainError;

/// Fan-out publisher for single-process deployments and tests
///
/// A channel exists once someone subscribes to it. Publishing to a channel with
/// no live receivers drops the message, matching Redis PUBLISH semantics.
#[derive(Debug)]
pub struct InMemoryPublisher {
    channels: RwLock<HashMap<String, broadcast::Sender<String>>>,
    capacity: usize,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Sets how many unread messages a lagging receiver may buffer
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Subscribes to a channel; only messages published afterwards are received
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<String> {
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);

        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

#[cfg(test)]
impl InMemoryPublisher {
    fn channel_count(&self) -> usize {
        self.channels.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for InMemoryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish_raw(&self, channel: &str, payload: &str) -> Result<usize, DomainError> {
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);

        let Some(sender) = channels.get(channel) else {
            return Ok(0);
        };

        // Every receiver is gone; forget the channel until someone subscribes again
        if sender.receiver_count() == 0 {
            channels.remove(channel);
            return Ok(0);
        }

        Ok(sender.send(payload.to_string()).unwrap_or(0))
    }
}
