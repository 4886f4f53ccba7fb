//! Event publisher trait

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// One-way transport for serialized change events
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync + std::fmt::Debug {
    /// Publishes a serialized payload to a channel
    ///
    /// Returns how many subscribers the transport handed the message to. This is
    /// not a delivery acknowledgment.
    async fn publish_raw(&self, channel: &str, payload: &str) -> Result<usize, DomainError>;
}
