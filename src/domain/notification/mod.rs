//! Notification domain - Change events and the publisher abstraction

mod event;
mod publisher;

pub use event::{
    ChangeEvent, Channel, OrderChanged, ProductChanged, SyncAvailable, SYNC_AVAILABLE_ACTION,
};
pub use publisher::EventPublisher;

#[cfg(test)]
pub use publisher::MockEventPublisher;
