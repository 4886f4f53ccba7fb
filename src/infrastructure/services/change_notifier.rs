//! Change notification service
//!
//! Fire-and-forget: a publish is attempted exactly once, failures are logged
//! and swallowed, and nothing waits for subscribers to receive the message.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::notification::{
    Channel, EventPublisher, OrderChanged, ProductChanged, SyncAvailable,
};

/// Announces catalog and order changes to other processes
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    publisher: Arc<dyn EventPublisher>,
}

impl ChangeNotifier {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    /// Serializes `message` as JSON and publishes it on `channel`
    pub async fn publish<M>(&self, channel: Channel, message: &M)
    where
        M: Serialize + Sync + ?Sized,
    {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(channel = %channel, error = %e, "Pub/Sub serialization error");
                return;
            }
        };

        match self.publisher.publish_raw(channel.as_str(), &payload).await {
            Ok(receivers) => {
                counter!("catalog_cache_events_published_total", "channel" => channel.as_str())
                    .increment(1);
                debug!(channel = %channel, receivers, "Published change event");
            }
            Err(e) => {
                counter!("catalog_cache_faults_total", "operation" => "publish").increment(1);
                warn!(channel = %channel, error = %e, "Pub/Sub publish error");
            }
        }
    }

    pub async fn notify_product_change(&self, product_id: &str, action: &str) {
        let event = ProductChanged {
            product_id: product_id.to_string(),
            action: action.to_string(),
        };
        self.publish(Channel::Products, &event).await;
    }

    /// `user_id` is sent as `null` when the order has no owner
    pub async fn notify_order_change(&self, order_id: &str, action: &str, user_id: Option<&str>) {
        let event = OrderChanged {
            order_id: order_id.to_string(),
            action: action.to_string(),
            user_id: user_id.map(str::to_string),
        };
        self.publish(Channel::Orders, &event).await;
    }

    /// Tells clients that fresh data for `tables` can be pulled
    pub async fn notify_sync_available<I, S>(&self, tables: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.publish(Channel::Sync, &SyncAvailable::new(tables)).await;
    }
}
