//! Background jobs run by the worker

pub mod close_purge;
pub mod retry;

pub use close_purge::{close_purge_key, ClosePurgeJob, ClosePurgePayload, PurgeOutcome, CLOSE_PURGE_JOB};
pub use retry::{RetryDecision, RetryPolicy};
