//! Infrastructure event bus implementations.
//!
//! The bus abstraction lives in `unitsvc-events`; this module provides the
//! network-backed sink used in production (Redis pub/sub).

#[cfg(feature = "redis")]
pub mod redis_pubsub;

#[cfg(feature = "redis")]
pub use redis_pubsub::{RedisBusError, RedisPubSubEventBus};
