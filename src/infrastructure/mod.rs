//! Infrastructure layer - External service implementations

pub mod cache;
pub mod connection;
pub mod logging;
pub mod pubsub;
pub mod services;
