//! Change events and the channels they travel on

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Action value carried by every sync-availability event
pub const SYNC_AVAILABLE_ACTION: &str = "sync_available";

/// Broadcast topic; channels hold no state, a message only exists while delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Products,
    Orders,
    Sync,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Self::Products, Self::Orders, Self::Sync];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "channel:products",
            Self::Orders => "channel:orders",
            Self::Sync => "channel:sync",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = DomainError;

    /// Accepts both the full channel name and its short form (`products`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix("channel:").unwrap_or(s);

        match name {
            "products" => Ok(Self::Products),
            "orders" => Ok(Self::Orders),
            "sync" => Ok(Self::Sync),
            _ => Err(DomainError::validation(format!(
                "Unknown channel: {}. Valid channels: products, orders, sync",
                s
            ))),
        }
    }
}

/// A product was created, updated or removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductChanged {
    pub product_id: String,
    pub action: String,
}

/// An order changed state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderChanged {
    pub order_id: String,
    pub action: String,
    /// Serialized as `null` when absent
    pub user_id: Option<String>,
}

/// Fresh data is available for incremental sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAvailable {
    pub tables: Vec<String>,
    pub action: String,
}

impl SyncAvailable {
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            action: SYNC_AVAILABLE_ACTION.to_string(),
        }
    }
}

/// Change event received from, or destined for, a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Product(ProductChanged),
    Order(OrderChanged),
    Sync(SyncAvailable),
}

impl ChangeEvent {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Product(_) => Channel::Products,
            Self::Order(_) => Channel::Orders,
            Self::Sync(_) => Channel::Sync,
        }
    }

    /// Serializes the event body without any envelope
    pub fn to_payload(&self) -> Result<String, DomainError> {
        let payload = match self {
            Self::Product(event) => serde_json::to_string(event)?,
            Self::Order(event) => serde_json::to_string(event)?,
            Self::Sync(event) => serde_json::to_string(event)?,
        };
        Ok(payload)
    }

    /// Decodes a payload using the schema of the channel it arrived on
    pub fn decode(channel: &str, payload: &str) -> Result<Self, DomainError> {
        let event = match channel.parse::<Channel>()? {
            Channel::Products => Self::Product(serde_json::from_str(payload)?),
            Channel::Orders => Self::Order(serde_json::from_str(payload)?),
            Channel::Sync => Self::Sync(serde_json::from_str(payload)?),
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(Channel::Products.as_str(), "channel:products");
        assert_eq!(Channel::Orders.to_string(), "channel:orders");
        assert_eq!(Channel::Sync.as_str(), "channel:sync");
    }

    #[test]
    fn test_channel_from_str() {
        assert_eq!("channel:orders".parse::<Channel>().unwrap(), Channel::Orders);
        assert_eq!("sync".parse::<Channel>().unwrap(), Channel::Sync);
        assert!("channel:carts".parse::<Channel>().is_err());
    }

    #[test]
    fn test_product_payload_shape() {
        let event = ChangeEvent::Product(ProductChanged {
            product_id: "p1".to_string(),
            action: "updated".to_string(),
        });

        assert_eq!(
            event.to_payload().unwrap(),
            r#"{"product_id":"p1","action":"updated"}"#
        );
    }

    #[test]
    fn test_order_payload_without_user() {
        let event = ChangeEvent::Order(OrderChanged {
            order_id: "o1".to_string(),
            action: "created".to_string(),
            user_id: None,
        });

        assert_eq!(
            event.to_payload().unwrap(),
            r#"{"order_id":"o1","action":"created","user_id":null}"#
        );
    }

    #[test]
    fn test_sync_payload_shape() {
        let event = ChangeEvent::Sync(SyncAvailable::new(["products", "categories"]));

        assert_eq!(
            event.to_payload().unwrap(),
            r#"{"tables":["products","categories"],"action":"sync_available"}"#
        );
    }

    #[test]
    fn test_decode_uses_channel_schema() {
        let event =
            ChangeEvent::decode("channel:orders", r#"{"order_id":"o9","action":"paid","user_id":"u1"}"#)
                .unwrap();

        assert_eq!(event.channel(), Channel::Orders);
        assert_eq!(
            event,
            ChangeEvent::Order(OrderChanged {
                order_id: "o9".to_string(),
                action: "paid".to_string(),
                user_id: Some("u1".to_string()),
            })
        );
    }

    #[test]
    fn test_decode_rejects_mismatched_payload() {
        let result = ChangeEvent::decode("channel:products", r#"{"tables":[]}"#);
        assert!(result.is_err());

        let result = ChangeEvent::decode("channel:unknown", "{}");
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
