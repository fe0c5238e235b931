//! Redis Pub/Sub fan-out of chat events.

mod channels;
mod notification;
mod publisher;

pub use channels::{PubSubChannel, STAFF_CHANNEL, THREAD_CHANNEL_PREFIX};
pub use notification::RedisNotificationSink;
pub use publisher::{PubSubEvent, Publisher};
