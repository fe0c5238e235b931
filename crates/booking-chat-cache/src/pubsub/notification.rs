//! `NotificationSink` over Redis Pub/Sub

use async_trait::async_trait;

use booking_chat_core::traits::{NotificationSink, RepoResult};
use booking_chat_core::{DomainError, DomainEvent};

use crate::pool::RedisPool;
use crate::pubsub::{PubSubChannel, PubSubEvent, Publisher};

/// Publishes each chat event to its thread channel and the staff channel
#[derive(Clone)]
pub struct RedisNotificationSink {
    publisher: Publisher,
}

impl RedisNotificationSink {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            publisher: Publisher::new(pool),
        }
    }

    /// Channels an event is delivered to
    #[must_use]
    pub fn channels_for(event: &DomainEvent) -> [PubSubChannel; 2] {
        [PubSubChannel::thread(event.thread_id()), PubSubChannel::Staff]
    }

    pub fn envelope(event: &DomainEvent) -> Result<PubSubEvent, serde_json::Error> {
        Ok(PubSubEvent::new(event.event_type(), serde_json::to_value(event)?))
    }
}

#[async_trait]
impl NotificationSink for RedisNotificationSink {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        let envelope =
            Self::envelope(event).map_err(|e| DomainError::InternalError(e.to_string()))?;
        self.publisher
            .publish_many(&Self::channels_for(event), &envelope)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;
        Ok(())
    }
}
