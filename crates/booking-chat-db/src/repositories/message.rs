//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use booking_chat_core::entities::Message;
use booking_chat_core::traits::{MessageQuery, MessageRepository, RepoResult};
use booking_chat_core::value_objects::Snowflake;

use crate::models::MessageModel;

use super::error::{map_db_error, map_rows};

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self, message), fields(message_id = %message.id, thread_id = %message.thread_id))]
    async fn create_if_open(&self, message: &Message) -> RepoResult<bool> {
        // FOR SHARE blocks a concurrent `open -> closing` update until this
        // insert commits, so the purge job always sees the row
        let result = sqlx::query(
            r"
            INSERT INTO chat_messages
                (id, thread_id, sender_id, message_type, text, media_path, latitude, longitude, created_at)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
            WHERE EXISTS (
                SELECT 1 FROM chat_threads
                WHERE id = $2 AND status = 'open'
                FOR SHARE
            )
            ",
        )
        .bind(message.id.into_inner())
        .bind(message.thread_id.into_inner())
        .bind(message.sender_id.into_inner())
        .bind(message.kind.as_str())
        .bind(message.text.as_deref())
        .bind(message.media_path.as_deref())
        .bind(message.latitude)
        .bind(message.longitude)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn find_by_thread(
        &self,
        thread_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        let limit = query.limit.clamp(1, 100);

        let mut rows = match (query.before, query.after) {
            (Some(before), None) => {
                // Page backwards from the cursor
                sqlx::query_as::<_, MessageModel>(
                    r"
                    SELECT id, thread_id, sender_id, message_type, text, media_path, latitude, longitude, created_at
                    FROM chat_messages
                    WHERE thread_id = $1 AND id < $2
                    ORDER BY id DESC
                    LIMIT $3
                    ",
                )
                .bind(thread_id.into_inner())
                .bind(before.into_inner())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            (None, Some(after)) => {
                sqlx::query_as::<_, MessageModel>(
                    r"
                    SELECT id, thread_id, sender_id, message_type, text, media_path, latitude, longitude, created_at
                    FROM chat_messages
                    WHERE thread_id = $1 AND id > $2
                    ORDER BY id ASC
                    LIMIT $3
                    ",
                )
                .bind(thread_id.into_inner())
                .bind(after.into_inner())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            _ => {
                // Latest page
                sqlx::query_as::<_, MessageModel>(
                    r"
                    SELECT id, thread_id, sender_id, message_type, text, media_path, latitude, longitude, created_at
                    FROM chat_messages
                    WHERE thread_id = $1
                    ORDER BY id DESC
                    LIMIT $2
                    ",
                )
                .bind(thread_id.into_inner())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_db_error)?;

        // Always hand back oldest first
        rows.sort_by_key(|row| row.id);
        map_rows(rows)
    }

    #[instrument(skip(self))]
    async fn media_paths(&self, thread_id: Snowflake) -> RepoResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r"
            SELECT media_path
            FROM chat_messages
            WHERE thread_id = $1 AND media_path IS NOT NULL
            ORDER BY id ASC
            ",
        )
        .bind(thread_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn redact_thread(&self, thread_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE chat_messages
            SET text = NULL, media_path = NULL, latitude = NULL, longitude = NULL
            WHERE thread_id = $1
              AND (text IS NOT NULL OR media_path IS NOT NULL
                   OR latitude IS NOT NULL OR longitude IS NOT NULL)
            ",
        )
        .bind(thread_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
