//! Integration test utilities for the booking chat server
//!
//! Helpers for running end-to-end tests against the REST API and the job
//! worker, backed by real PostgreSQL and Redis instances.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
