//! # booking-chat-worker
//!
//! Claims due jobs from the Redis queue and runs them with bounded
//! concurrency, retrying failures on the configured backoff and
//! dead-lettering the rest. Also re-enqueues purges of threads that have
//! been `closing` for too long.

pub mod runner;
pub mod setup;

pub use runner::{dispatch, settle, JobRunner, RunnerConfig, Settlement};
pub use setup::{create_runner, run};
