//! Close-and-purge job
//!
//! Runs after a thread moves to `closing`: deletes the thread's media,
//! optionally redacts message content, then marks the thread `closed`.
//! Delivery is at least once, so every step tolerates having run before.

use std::future::Future;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use booking_chat_core::{DomainError, MediaPath, RepoResult, Snowflake, ThreadStatus};

use crate::services::{ServiceContext, ServiceError, ServiceResult};

/// Queue name of the job
pub const CLOSE_PURGE_JOB: &str = "chat.close_purge";

/// Queue key of a thread's purge job; at most one is pending per thread
pub fn close_purge_key(thread_id: Snowflake) -> String {
    format!("close_purge:{thread_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosePurgePayload {
    pub thread_id: Snowflake,
}

/// Result of one successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Thread no longer exists
    Missing,
    /// Thread is still open; nothing was asked of this job
    NotClosing,
    /// An earlier run already finished
    AlreadyClosed,
    Closed {
        media_deleted: usize,
        orphans_deleted: u64,
        messages_redacted: u64,
    },
}

pub struct ClosePurgeJob<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ClosePurgeJob<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Decode a queued payload and run the job
    pub async fn handle(&self, payload: &serde_json::Value) -> ServiceResult<PurgeOutcome> {
        let payload: ClosePurgePayload = serde_json::from_value(payload.clone())
            .map_err(|e| ServiceError::internal(format!("invalid {CLOSE_PURGE_JOB} payload: {e}")))?;
        self.run(payload.thread_id).await
    }

    #[instrument(skip(self))]
    pub async fn run(&self, thread_id: Snowflake) -> ServiceResult<PurgeOutcome> {
        let Some(thread) = self.ctx.thread_repo().find_by_id(thread_id).await? else {
            debug!("Thread gone; nothing to purge");
            return Ok(PurgeOutcome::Missing);
        };

        if !thread.status.can_transition_to(ThreadStatus::Closed) {
            if thread.is_closed() {
                return Ok(PurgeOutcome::AlreadyClosed);
            }
            warn!("Purge requested for an open thread; skipping");
            return Ok(PurgeOutcome::NotClosing);
        }

        let media_deleted = self.delete_message_media(thread_id).await?;

        // Uploads never attached to a message live under the same prefix
        let orphans_deleted = self
            .with_timeout("delete_prefix", self.ctx.object_store().delete_prefix(thread_id))
            .await?;

        let messages_redacted = if self.ctx.settings().redact_messages {
            self.ctx.message_repo().redact_thread(thread_id).await?
        } else {
            0
        };

        if !self
            .ctx
            .thread_repo()
            .mark_closed(thread_id, Utc::now())
            .await?
        {
            debug!("Another run closed the thread first");
            return Ok(PurgeOutcome::AlreadyClosed);
        }

        info!(
            media_deleted,
            orphans_deleted, messages_redacted, "Chat thread closed and purged"
        );

        Ok(PurgeOutcome::Closed {
            media_deleted,
            orphans_deleted,
            messages_redacted,
        })
    }

    async fn delete_message_media(&self, thread_id: Snowflake) -> ServiceResult<usize> {
        let paths = self.ctx.message_repo().media_paths(thread_id).await?;

        let mut deleted = 0;
        for raw in &paths {
            let Some(path) = MediaPath::for_thread(thread_id, raw) else {
                // Best-effort purge: a bad stored key must not keep the thread open
                warn!(path = %raw, "Skipping malformed media path");
                continue;
            };
            self.with_timeout("delete", self.ctx.object_store().delete(&path))
                .await?;
            deleted += 1;
        }
        Ok(deleted)
    }

    async fn with_timeout<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = RepoResult<T>>,
    ) -> ServiceResult<T> {
        match tokio::time::timeout(self.ctx.settings().storage_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(DomainError::Timeout(format!("object store {op}")).into()),
        }
    }
}
