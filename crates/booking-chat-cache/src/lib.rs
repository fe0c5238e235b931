//! # booking-chat-cache
//!
//! Redis-backed infrastructure for the chat subsystem.
//!
//! ## Features
//!
//! - **Connection Pool**: managed Redis connection pool with deadpool
//! - **Pub/Sub**: chat events fanned out to thread and staff channels
//! - **Job Queue**: delayed, deduplicated jobs with leases and a dead-letter set
//!
//! ## Example
//!
//! ```ignore
//! use booking_chat_cache::{RedisPool, RedisPoolConfig, RedisNotificationSink, RedisTaskQueue};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let sink = RedisNotificationSink::new(pool.clone());
//! let queue = RedisTaskQueue::new(pool);
//! ```

pub mod pool;
pub mod pubsub;
pub mod queue;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export pubsub types
pub use pubsub::{
    PubSubChannel, PubSubEvent, Publisher, RedisNotificationSink, STAFF_CHANNEL,
    THREAD_CHANNEL_PREFIX,
};

// Re-export queue types
pub use queue::{QueuedJob, RedisTaskQueue, DEFAULT_NAMESPACE};
