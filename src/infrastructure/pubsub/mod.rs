//! Pub/sub infrastructure - Change event transports

mod in_memory;
mod redis;

pub use in_memory::InMemoryPublisher;
pub use self::redis::{RedisPublisher, RedisSubscriber};
