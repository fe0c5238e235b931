//! External collaborators consumed by the chat core

use std::time::Duration;

use async_trait::async_trait;

use crate::entities::Booking;
use crate::events::DomainEvent;
use crate::traits::RepoResult;
use crate::value_objects::{MediaPath, Snowflake};

/// Read access to the host platform's bookings
#[async_trait]
pub trait BookingLookup: Send + Sync {
    /// Owning client of the booking, `None` if it does not exist
    async fn owner_of(&self, booking_id: Snowflake) -> RepoResult<Option<Snowflake>>;

    async fn exists(&self, booking_id: Snowflake) -> RepoResult<bool> {
        Ok(self.owner_of(booking_id).await?.is_some())
    }

    async fn find(&self, booking_id: Snowflake) -> RepoResult<Option<Booking>> {
        Ok(self.owner_of(booking_id).await?.map(|client_id| Booking {
            id: booking_id,
            client_id,
        }))
    }
}

/// Binary media storage namespaced by thread
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under the thread's namespace and return the key
    async fn put(&self, thread_id: Snowflake, filename: &str, bytes: &[u8]) -> RepoResult<MediaPath>;

    /// Time-limited read URL; generated on demand, never persisted
    async fn signed_read_url(&self, path: &MediaPath, ttl_secs: u64) -> RepoResult<String>;

    /// Delete one object; a missing object is not an error
    async fn delete(&self, path: &MediaPath) -> RepoResult<()>;

    /// Delete every object of the thread; returns how many were removed
    async fn delete_prefix(&self, thread_id: Snowflake) -> RepoResult<u64>;
}

/// Delayed job queue with at-least-once delivery
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Schedule `job` to run after `delay`
    ///
    /// `key` deduplicates: while a job with the same key is pending the call
    /// is a no-op and returns false.
    async fn enqueue(
        &self,
        job: &str,
        key: &str,
        payload: serde_json::Value,
        delay: Duration,
    ) -> RepoResult<bool>;
}

/// Fire-and-forget fan-out of domain events
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()>;
}
