//! Repository traits (ports) - persistence boundary for threads and messages
//!
//! Repositories own no business rules. The conditional status updates are
//! the exception that makes concurrent closes safe: they report whether this
//! caller's update won.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Message, Thread};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Thread Repository
// ============================================================================

#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Find thread by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Thread>>;

    /// Find the thread attached to a booking
    async fn find_by_booking(&self, booking_id: Snowflake) -> RepoResult<Option<Thread>>;

    /// Insert `thread` unless its booking already has one; returns the stored row
    async fn create_or_get(&self, thread: &Thread) -> RepoResult<Thread>;

    /// `open -> closing`; false if the thread was not open
    async fn begin_closing(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<bool>;

    /// `closing -> closed`, stamping `closed_at`; false if not closing
    async fn mark_closed(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<bool>;

    /// Record `staff_id` as admin if none is recorded yet
    async fn assign_admin_if_unset(&self, id: Snowflake, staff_id: Snowflake) -> RepoResult<bool>;

    /// Threads stuck in `closing` since before `before`, oldest first
    async fn find_stalled_closing(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> RepoResult<Vec<Thread>>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Pagination options for message queries
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    pub before: Option<Snowflake>,
    pub after: Option<Snowflake>,
    pub limit: i64,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist `message` only while its thread is `open`; false if it is not
    async fn create_if_open(&self, message: &Message) -> RepoResult<bool>;

    /// List messages in a thread, ordered by id ascending
    async fn find_by_thread(&self, thread_id: Snowflake, query: MessageQuery)
        -> RepoResult<Vec<Message>>;

    /// Media keys still referenced by messages of the thread
    async fn media_paths(&self, thread_id: Snowflake) -> RepoResult<Vec<String>>;

    /// Null all content columns of the thread's messages; returns rows changed
    async fn redact_thread(&self, thread_id: Snowflake) -> RepoResult<u64>;
}
