//! # booking-chat-service
//!
//! Application layer: the chat use cases, request/response DTOs, and the
//! close-and-purge background job with its retry policy.

pub mod dto;
pub mod jobs;
pub mod services;

pub use jobs::{
    close_purge_key, ClosePurgeJob, ClosePurgePayload, PurgeOutcome, RetryDecision, RetryPolicy,
    CLOSE_PURGE_JOB,
};
pub use services::{ChatService, ChatSettings, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult};
