//! PostgreSQL implementation of ThreadRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use booking_chat_core::entities::Thread;
use booking_chat_core::traits::{RepoResult, ThreadRepository};
use booking_chat_core::value_objects::Snowflake;
use booking_chat_core::DomainError;

use crate::models::ThreadModel;

use super::error::{map_db_error, map_rows};

/// PostgreSQL implementation of ThreadRepository
#[derive(Clone)]
pub struct PgThreadRepository {
    pool: PgPool,
}

impl PgThreadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThreadRepository for PgThreadRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Thread>> {
        let row = sqlx::query_as::<_, ThreadModel>(
            r"
            SELECT id, booking_id, client_id, admin_id, status, opened_at, close_requested_at, closed_at
            FROM chat_threads
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(Thread::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_booking(&self, booking_id: Snowflake) -> RepoResult<Option<Thread>> {
        let row = sqlx::query_as::<_, ThreadModel>(
            r"
            SELECT id, booking_id, client_id, admin_id, status, opened_at, close_requested_at, closed_at
            FROM chat_threads
            WHERE booking_id = $1
            ",
        )
        .bind(booking_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(Thread::try_from).transpose()
    }

    #[instrument(skip(self, thread), fields(thread_id = %thread.id, booking_id = %thread.booking_id))]
    async fn create_or_get(&self, thread: &Thread) -> RepoResult<Thread> {
        let inserted = sqlx::query_as::<_, ThreadModel>(
            r"
            INSERT INTO chat_threads (id, booking_id, client_id, admin_id, status, opened_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (booking_id) DO NOTHING
            RETURNING id, booking_id, client_id, admin_id, status, opened_at, close_requested_at, closed_at
            ",
        )
        .bind(thread.id.into_inner())
        .bind(thread.booking_id.into_inner())
        .bind(thread.client_id.into_inner())
        .bind(thread.admin_id.map(Snowflake::into_inner))
        .bind(thread.status.as_str())
        .bind(thread.opened_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        if let Some(row) = inserted {
            return Thread::try_from(row);
        }

        // Lost the insert to an existing or concurrent row for the booking
        self.find_by_booking(thread.booking_id).await?.ok_or_else(|| {
            DomainError::DatabaseError(format!(
                "thread for booking {} vanished after conflict",
                thread.booking_id
            ))
        })
    }

    #[instrument(skip(self))]
    async fn begin_closing(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE chat_threads
            SET status = 'closing', close_requested_at = $2
            WHERE id = $1 AND status = 'open'
            ",
        )
        .bind(id.into_inner())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn mark_closed(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE chat_threads
            SET status = 'closed', closed_at = $2
            WHERE id = $1 AND status = 'closing'
            ",
        )
        .bind(id.into_inner())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn assign_admin_if_unset(&self, id: Snowflake, staff_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE chat_threads
            SET admin_id = $2
            WHERE id = $1 AND admin_id IS NULL
            ",
        )
        .bind(id.into_inner())
        .bind(staff_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn find_stalled_closing(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> RepoResult<Vec<Thread>> {
        let rows = sqlx::query_as::<_, ThreadModel>(
            r"
            SELECT id, booking_id, client_id, admin_id, status, opened_at, close_requested_at, closed_at
            FROM chat_threads
            WHERE status = 'closing' AND close_requested_at < $1
            ORDER BY close_requested_at ASC
            LIMIT $2
            ",
        )
        .bind(before)
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_rows(rows)
    }
}
