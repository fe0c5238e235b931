//! Chat service
//!
//! Thread lifecycle and message posting for per-booking chats. Every public
//! operation validates and authorizes before it writes anything.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use booking_chat_core::{
    Actor, DomainError, DomainEvent, MediaPath, Message, Snowflake, Thread, ThreadStatus,
};

use crate::dto::{
    ListMessagesQuery, MediaUploadResponse, MessageResponse, PostMessageRequest, ThreadResponse,
    UploadMediaQuery,
};
use crate::jobs::{close_purge_key, ClosePurgePayload, CLOSE_PURGE_JOB};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Chat service
pub struct ChatService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChatService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create-or-fetch the booking's single thread
    ///
    /// An existing thread is returned as is, whatever its status.
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn open_thread(
        &self,
        booking_id: Snowflake,
        actor: &Actor,
    ) -> ServiceResult<ThreadResponse> {
        self.ensure_enabled()?;

        let booking = self
            .ctx
            .bookings()
            .find(booking_id)
            .await?
            .ok_or(DomainError::BookingNotFound(booking_id))?;

        if !booking.can_open_chat(actor) {
            warn!(
                actor_id = %actor.id,
                booking_id = %booking_id,
                action = "open",
                "Chat access denied"
            );
            return Err(DomainError::Forbidden.into());
        }

        let thread = match self.ctx.thread_repo().find_by_booking(booking_id).await? {
            Some(existing) => existing,
            None => {
                let fresh = Thread::open(self.ctx.generate_id(), booking_id, booking.client_id, actor);
                let stored = self.ctx.thread_repo().create_or_get(&fresh).await?;
                if stored.id == fresh.id {
                    info!(thread_id = %stored.id, booking_id = %booking_id, "Chat thread opened");
                }
                stored
            }
        };

        Ok(self.note_staff(thread, actor).await.into())
    }

    /// Fetch a thread the actor participates in, in any status
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn get_thread(
        &self,
        thread_id: Snowflake,
        actor: &Actor,
    ) -> ServiceResult<ThreadResponse> {
        let thread = self.load_for(thread_id, actor, "read").await?;
        Ok(thread.into())
    }

    /// Messages in id order; image messages get a fresh signed URL
    #[instrument(skip(self, query), fields(actor_id = %actor.id))]
    pub async fn list_messages(
        &self,
        thread_id: Snowflake,
        actor: &Actor,
        query: ListMessagesQuery,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let thread = self.load_for(thread_id, actor, "read").await?;
        // Media of a closed thread is gone even when content was kept
        let sign_media = !thread.is_closed();

        let messages = self
            .ctx
            .message_repo()
            .find_by_thread(thread_id, query.to_query())
            .await?;

        let mut responses = Vec::with_capacity(messages.len());
        for message in messages {
            responses.push(self.to_response(message, sign_media).await);
        }
        Ok(responses)
    }

    /// Validate, persist and announce a message
    #[instrument(skip(self, request), fields(actor_id = %actor.id, kind = request.declared_type()))]
    pub async fn post_message(
        &self,
        thread_id: Snowflake,
        actor: &Actor,
        request: PostMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        self.ensure_enabled()?;

        let thread = self.load_for(thread_id, actor, "post").await?;
        if !thread.is_open() {
            return Err(DomainError::ThreadClosed(thread_id).into());
        }

        let content = request.into_content(thread_id).map_err(DomainError::from)?;
        let message = Message::new(self.ctx.generate_id(), thread_id, actor.id, content);

        if !self.ctx.message_repo().create_if_open(&message).await? {
            debug!("Thread left `open` before the message was stored");
            return Err(DomainError::ThreadClosed(thread_id).into());
        }
        debug!(message_id = %message.id, kind = %message.kind, "Message created");

        self.note_staff(thread, actor).await;
        self.publish(&DomainEvent::message_created(&message)).await;

        Ok(self.to_response(message, true).await)
    }

    /// Move the thread to `closing` and schedule its purge
    ///
    /// Only the caller whose conditional update wins enqueues the job; every
    /// other call returns the thread in its current state.
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn close_thread(
        &self,
        thread_id: Snowflake,
        actor: &Actor,
    ) -> ServiceResult<ThreadResponse> {
        let mut thread = self.load_for(thread_id, actor, "close").await?;
        if !thread.status.can_transition_to(ThreadStatus::Closing) {
            return Ok(thread.into());
        }

        let now = Utc::now();
        if !self.ctx.thread_repo().begin_closing(thread_id, now).await? {
            debug!("Close lost the race; returning current state");
            let current = self
                .ctx
                .thread_repo()
                .find_by_id(thread_id)
                .await?
                .ok_or(DomainError::ThreadNotFound(thread_id))?;
            return Ok(current.into());
        }

        thread.status = ThreadStatus::Closing;
        thread.close_requested_at = Some(now);
        info!(thread_id = %thread_id, "Chat thread closing");

        self.schedule_purge(thread_id, self.ctx.settings().close_purge_delay)
            .await;
        let thread = self.note_staff(thread, actor).await;
        self.publish(&DomainEvent::thread_closed(&thread, actor.id)).await;

        Ok(thread.into())
    }

    /// Store an upload under the thread's namespace
    #[instrument(skip(self, query, bytes), fields(actor_id = %actor.id, size = bytes.len()))]
    pub async fn upload_media(
        &self,
        thread_id: Snowflake,
        actor: &Actor,
        query: UploadMediaQuery,
        bytes: Vec<u8>,
    ) -> ServiceResult<MediaUploadResponse> {
        self.ensure_enabled()?;

        let thread = self.load_for(thread_id, actor, "upload").await?;
        if !thread.is_open() {
            return Err(DomainError::ThreadClosed(thread_id).into());
        }

        query.validate()?;
        if bytes.is_empty() {
            return Err(ServiceError::validation("File is empty"));
        }
        let max = self.ctx.settings().max_upload_bytes;
        if bytes.len() > max {
            return Err(ServiceError::validation(format!(
                "File exceeds the {} MB limit",
                max / (1024 * 1024)
            )));
        }

        let path = self
            .ctx
            .object_store()
            .put(thread_id, &query.filename, &bytes)
            .await?;

        // A close that won meanwhile may already have swept the namespace
        let still_open = self
            .ctx
            .thread_repo()
            .find_by_id(thread_id)
            .await?
            .is_some_and(|t| t.is_open());
        if !still_open {
            self.ctx.object_store().delete(&path).await?;
            debug!(path = %path, "Upload withdrawn; thread left `open`");
            return Err(DomainError::ThreadClosed(thread_id).into());
        }

        let ttl = self.ctx.settings().signed_url_ttl_secs;
        let url = self.ctx.object_store().signed_read_url(&path, ttl).await?;

        info!(thread_id = %thread_id, path = %path, "Media uploaded");

        Ok(MediaUploadResponse {
            media_path: path.into_inner(),
            url,
            expires_in: ttl,
        })
    }

    /// Re-enqueue the purge of threads stuck in `closing`
    ///
    /// Returns how many jobs were actually scheduled; threads whose job is
    /// still pending or dead-lettered are skipped by the queue.
    #[instrument(skip(self))]
    pub async fn requeue_stalled_closures(
        &self,
        older_than: Duration,
        limit: i64,
    ) -> ServiceResult<usize> {
        let age = chrono::Duration::from_std(older_than)
            .map_err(|e| ServiceError::internal(format!("stall window out of range: {e}")))?;
        let cutoff = Utc::now() - age;

        let stalled = self
            .ctx
            .thread_repo()
            .find_stalled_closing(cutoff, limit)
            .await?;

        let mut scheduled = 0;
        for thread in &stalled {
            if self.schedule_purge(thread.id, Duration::ZERO).await {
                scheduled += 1;
            }
        }

        if scheduled > 0 {
            info!(found = stalled.len(), scheduled, "Requeued stalled closures");
        }
        Ok(scheduled)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn ensure_enabled(&self) -> ServiceResult<()> {
        if self.ctx.settings().enabled {
            Ok(())
        } else {
            Err(DomainError::FeatureDisabled.into())
        }
    }

    /// Load a thread and require the actor to be a participant
    async fn load_for(
        &self,
        thread_id: Snowflake,
        actor: &Actor,
        action: &'static str,
    ) -> ServiceResult<Thread> {
        let thread = self
            .ctx
            .thread_repo()
            .find_by_id(thread_id)
            .await?
            .ok_or(DomainError::ThreadNotFound(thread_id))?;

        if !thread.is_participant(actor) {
            warn!(
                actor_id = %actor.id,
                thread_id = %thread_id,
                action,
                "Chat access denied"
            );
            return Err(DomainError::Forbidden.into());
        }
        Ok(thread)
    }

    /// Record the first staff member to act on the thread
    async fn note_staff(&self, mut thread: Thread, actor: &Actor) -> Thread {
        if !actor.is_staff || thread.admin_id.is_some() {
            return thread;
        }
        match self
            .ctx
            .thread_repo()
            .assign_admin_if_unset(thread.id, actor.id)
            .await
        {
            Ok(true) => thread.admin_id = Some(actor.id),
            Ok(false) => {}
            Err(e) => warn!(thread_id = %thread.id, error = %e, "Admin assignment failed"),
        }
        thread
    }

    /// Enqueue the purge job; true if a new job was scheduled
    async fn schedule_purge(&self, thread_id: Snowflake, delay: Duration) -> bool {
        let payload = match serde_json::to_value(ClosePurgePayload { thread_id }) {
            Ok(payload) => payload,
            Err(e) => {
                error!(thread_id = %thread_id, error = %e, "Purge payload not serializable");
                return false;
            }
        };

        match self
            .ctx
            .task_queue()
            .enqueue(CLOSE_PURGE_JOB, &close_purge_key(thread_id), payload, delay)
            .await
        {
            Ok(true) => {
                debug!(thread_id = %thread_id, delay_secs = delay.as_secs(), "Purge job enqueued");
                true
            }
            Ok(false) => {
                debug!(thread_id = %thread_id, "Purge job already pending");
                false
            }
            Err(e) => {
                // The thread stays `closing`; the stalled sweep schedules it later
                error!(thread_id = %thread_id, error = %e, "Purge job not enqueued");
                false
            }
        }
    }

    async fn publish(&self, event: &DomainEvent) {
        if let Err(e) = self.ctx.notifications().publish(event).await {
            warn!(
                event_type = event.event_type(),
                thread_id = %event.thread_id(),
                error = %e,
                "Notification publish failed"
            );
        }
    }

    async fn to_response(&self, message: Message, sign_media: bool) -> MessageResponse {
        let path = message
            .media_path
            .as_deref()
            .filter(|_| sign_media)
            .and_then(MediaPath::parse);
        let url = match path {
            Some(path) => {
                let ttl = self.ctx.settings().signed_url_ttl_secs;
                match self.ctx.object_store().signed_read_url(&path, ttl).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        warn!(message_id = %message.id, error = %e, "Signed URL not generated");
                        None
                    }
                }
            }
            None => None,
        };
        MessageResponse::from(message).with_media_url(url)
    }
}
