//! Redis pub/sub-backed notification sink (optional).
//!
//! Each notification is published on the channel named after its topic
//! (`units.create`, `units.rename`, `units.delete`) with the bare affected id
//! as the message body. Pub/sub is not durable: subscribers that are offline
//! miss messages.

use std::sync::mpsc;
use std::thread;

use redis::Commands;
use thiserror::Error;

use unitsvc_events::{EventBus, Notification, Subscription};

/// Pattern matching every unit topic.
pub const UNIT_TOPICS_PATTERN: &str = "units.*";

#[derive(Debug, Error)]
pub enum RedisBusError {
    #[error("redis error: {0}")]
    Redis(String),
}

#[derive(Debug, Clone)]
pub struct RedisPubSubEventBus {
    client: redis::Client,
}

impl RedisPubSubEventBus {
    pub fn new(redis_url: impl AsRef<str>) -> Result<Self, RedisBusError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| RedisBusError::Redis(e.to_string()))?;
        Ok(Self { client })
    }
}

impl EventBus<Notification> for RedisPubSubEventBus {
    type Error = RedisBusError;

    fn publish(&self, message: Notification) -> Result<(), Self::Error> {
        let mut conn = self
            .client
            .get_connection()
            .map_err(|e| RedisBusError::Redis(e.to_string()))?;

        let _: i64 = conn
            .publish(message.topic().as_str(), message.payload())
            .map_err(|e| RedisBusError::Redis(e.to_string()))?;

        Ok(())
    }

    fn subscribe(&self) -> Subscription<Notification> {
        let (tx, rx) = mpsc::channel();
        let client = self.client.clone();

        thread::spawn(move || {
            let mut conn = match client.get_connection() {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "redis subscriber could not connect");
                    return;
                }
            };

            let mut pubsub = conn.as_pubsub();
            if let Err(e) = pubsub.psubscribe(UNIT_TOPICS_PATTERN) {
                tracing::warn!(error = %e, "redis psubscribe failed");
                return;
            }

            loop {
                let msg = match pubsub.get_message() {
                    Ok(m) => m,
                    Err(_) => return,
                };

                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(_) => continue,
                };

                let Some(notification) = Notification::from_wire(msg.get_channel_name(), payload) else {
                    tracing::debug!(channel = msg.get_channel_name(), "skipping message on unknown channel");
                    continue;
                };

                if tx.send(notification).is_err() {
                    return;
                }
            }
        });

        Subscription::new(rx)
    }
}
