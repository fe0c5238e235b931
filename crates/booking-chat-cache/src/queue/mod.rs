//! Delayed job queue on Redis

mod task_queue;

pub use task_queue::{QueuedJob, RedisTaskQueue, DEFAULT_NAMESPACE};
