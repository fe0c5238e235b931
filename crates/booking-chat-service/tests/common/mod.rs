//! In-memory fakes of every port, shared by the service tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use booking_chat_core::{
    Actor, BookingLookup, DomainError, DomainEvent, MediaPath, Message, MessageQuery,
    MessageRepository, NotificationSink, ObjectStore, RepoResult, Snowflake, SnowflakeGenerator,
    TaskQueue, Thread, ThreadRepository, ThreadStatus,
};
use booking_chat_service::{ChatSettings, ServiceContext};

// ============================================================================
// Repositories
// ============================================================================

#[derive(Default)]
pub struct InMemoryThreads {
    rows: Mutex<HashMap<Snowflake, Thread>>,
    close_after_read: AtomicBool,
}

impl InMemoryThreads {
    pub fn count(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn get(&self, id: Snowflake) -> Option<Thread> {
        self.rows.lock().get(&id).cloned()
    }

    pub fn insert(&self, thread: Thread) {
        self.rows.lock().insert(thread.id, thread);
    }

    pub fn remove(&self, id: Snowflake) {
        self.rows.lock().remove(&id);
    }

    /// The next `find_by_id` returns the row as stored, then the thread is
    /// closed and purged underneath the caller
    pub fn close_after_next_read(&self) {
        self.close_after_read.store(true, Ordering::SeqCst);
    }

    pub fn is_open(&self, id: Snowflake) -> bool {
        self.get(id).is_some_and(|t| t.is_open())
    }
}

#[async_trait]
impl ThreadRepository for InMemoryThreads {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Thread>> {
        let mut rows = self.rows.lock();
        let found = rows.get(&id).cloned();
        if self.close_after_read.swap(false, Ordering::SeqCst) {
            if let Some(t) = rows.get_mut(&id) {
                let now = Utc::now();
                t.status = ThreadStatus::Closed;
                t.close_requested_at.get_or_insert(now);
                t.closed_at = Some(now);
            }
        }
        Ok(found)
    }

    async fn find_by_booking(&self, booking_id: Snowflake) -> RepoResult<Option<Thread>> {
        Ok(self
            .rows
            .lock()
            .values()
            .find(|t| t.booking_id == booking_id)
            .cloned())
    }

    async fn create_or_get(&self, thread: &Thread) -> RepoResult<Thread> {
        let mut rows = self.rows.lock();
        if let Some(existing) = rows.values().find(|t| t.booking_id == thread.booking_id) {
            return Ok(existing.clone());
        }
        rows.insert(thread.id, thread.clone());
        Ok(thread.clone())
    }

    async fn begin_closing(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows.get_mut(&id) {
            Some(t) if t.status == ThreadStatus::Open => {
                t.status = ThreadStatus::Closing;
                t.close_requested_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_closed(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows.get_mut(&id) {
            Some(t) if t.status == ThreadStatus::Closing => {
                t.status = ThreadStatus::Closed;
                t.closed_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn assign_admin_if_unset(&self, id: Snowflake, staff_id: Snowflake) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows.get_mut(&id) {
            Some(t) if t.admin_id.is_none() => {
                t.admin_id = Some(staff_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_stalled_closing(
        &self,
        before: DateTime<Utc>,
        limit: i64,
    ) -> RepoResult<Vec<Thread>> {
        let mut stalled: Vec<_> = self
            .rows
            .lock()
            .values()
            .filter(|t| {
                t.status == ThreadStatus::Closing
                    && t.close_requested_at.is_some_and(|at| at < before)
            })
            .cloned()
            .collect();
        stalled.sort_by_key(|t| t.close_requested_at);
        stalled.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(stalled)
    }
}

/// Inserts check thread status through the shared [`InMemoryThreads`]
#[derive(Default)]
pub struct InMemoryMessages {
    rows: Mutex<Vec<Message>>,
    threads: Option<Arc<InMemoryThreads>>,
    fail_redact: AtomicBool,
}

impl InMemoryMessages {
    pub fn backed_by(threads: Arc<InMemoryThreads>) -> Self {
        Self {
            threads: Some(threads),
            ..Self::default()
        }
    }

    pub fn all(&self, thread_id: Snowflake) -> Vec<Message> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .iter()
            .filter(|m| m.thread_id == thread_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.id);
        rows
    }

    pub fn count(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn insert(&self, message: Message) {
        self.rows.lock().push(message);
    }

    pub fn fail_redaction(&self, fail: bool) {
        self.fail_redact.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessages {
    async fn create_if_open(&self, message: &Message) -> RepoResult<bool> {
        let open = self
            .threads
            .as_ref()
            .map_or(true, |threads| threads.is_open(message.thread_id));
        if open {
            self.insert(message.clone());
        }
        Ok(open)
    }

    async fn find_by_thread(
        &self,
        thread_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        let limit = usize::try_from(query.limit.clamp(1, 100)).unwrap_or(100);
        let rows = self.all(thread_id);
        let page = match (query.before, query.after) {
            (_, Some(after)) => rows.into_iter().filter(|m| m.id > after).take(limit).collect(),
            (Some(before), None) => {
                let older: Vec<_> = rows.into_iter().filter(|m| m.id < before).collect();
                older[older.len().saturating_sub(limit)..].to_vec()
            }
            (None, None) => rows[rows.len().saturating_sub(limit)..].to_vec(),
        };
        Ok(page)
    }

    async fn media_paths(&self, thread_id: Snowflake) -> RepoResult<Vec<String>> {
        Ok(self
            .all(thread_id)
            .into_iter()
            .filter_map(|m| m.media_path)
            .collect())
    }

    async fn redact_thread(&self, thread_id: Snowflake) -> RepoResult<u64> {
        if self.fail_redact.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("connection reset".into()));
        }
        let mut changed = 0;
        for message in self.rows.lock().iter_mut() {
            if message.thread_id == thread_id && !message.is_redacted() {
                message.redact();
                changed += 1;
            }
        }
        Ok(changed)
    }
}

// ============================================================================
// Collaborators
// ============================================================================

#[derive(Default)]
pub struct FakeBookings {
    owners: Mutex<HashMap<Snowflake, Snowflake>>,
}

impl FakeBookings {
    pub fn add(&self, booking_id: i64, client_id: i64) {
        self.owners
            .lock()
            .insert(Snowflake::new(booking_id), Snowflake::new(client_id));
    }
}

#[async_trait]
impl BookingLookup for FakeBookings {
    async fn owner_of(&self, booking_id: Snowflake) -> RepoResult<Option<Snowflake>> {
        Ok(self.owners.lock().get(&booking_id).copied())
    }
}

#[derive(Default)]
pub struct FakeObjectStore {
    objects: Mutex<HashSet<String>>,
    failures_left: AtomicU32,
    delay: Mutex<Option<Duration>>,
}

impl FakeObjectStore {
    pub fn insert(&self, path: &str) {
        self.objects.lock().insert(path.to_string());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().contains(path)
    }

    pub fn count_under(&self, thread_id: Snowflake) -> usize {
        let prefix = MediaPath::thread_prefix(thread_id);
        self.objects
            .lock()
            .iter()
            .filter(|p| p.starts_with(&prefix))
            .count()
    }

    /// Fail the next `n` delete calls
    pub fn fail_next_deletes(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn stall_deletes(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    async fn before_delete(&self) -> RepoResult<()> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let injected = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(DomainError::StorageError("object store unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put(&self, thread_id: Snowflake, filename: &str, _bytes: &[u8]) -> RepoResult<MediaPath> {
        let path = MediaPath::new(thread_id, &format!("u{}-{filename}", self.objects.lock().len()))
            .ok_or_else(|| DomainError::InvalidInput(filename.to_string()))?;
        self.insert(path.as_str());
        Ok(path)
    }

    async fn signed_read_url(&self, path: &MediaPath, ttl_secs: u64) -> RepoResult<String> {
        Ok(format!("https://media.test/media/{path}?ttl={ttl_secs}"))
    }

    async fn delete(&self, path: &MediaPath) -> RepoResult<()> {
        self.before_delete().await?;
        self.objects.lock().remove(path.as_str());
        Ok(())
    }

    async fn delete_prefix(&self, thread_id: Snowflake) -> RepoResult<u64> {
        self.before_delete().await?;
        let prefix = MediaPath::thread_prefix(thread_id);
        let mut objects = self.objects.lock();
        let before = objects.len();
        objects.retain(|p| !p.starts_with(&prefix));
        Ok((before - objects.len()) as u64)
    }
}

#[derive(Debug, Clone)]
pub struct EnqueuedJob {
    pub name: String,
    pub key: String,
    pub payload: serde_json::Value,
    pub delay: Duration,
}

/// Records jobs; a key stays pending until [`RecordingQueue::release`]
#[derive(Default)]
pub struct RecordingQueue {
    jobs: Mutex<Vec<EnqueuedJob>>,
    pending: Mutex<HashSet<String>>,
    unavailable: AtomicBool,
}

impl RecordingQueue {
    pub fn jobs(&self) -> Vec<EnqueuedJob> {
        self.jobs.lock().clone()
    }

    pub fn release(&self, key: &str) {
        self.pending.lock().remove(key);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskQueue for RecordingQueue {
    async fn enqueue(
        &self,
        job: &str,
        key: &str,
        payload: serde_json::Value,
        delay: Duration,
    ) -> RepoResult<bool> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::QueueError("redis down".into()));
        }
        if !self.pending.lock().insert(key.to_string()) {
            return Ok(false);
        }
        self.jobs.lock().push(EnqueuedJob {
            name: job.to_string(),
            key: key.to_string(),
            payload,
            delay,
        });
        Ok(true)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DomainEvent>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::CacheError("pubsub down".into()));
        }
        self.events.lock().push(event.clone());
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub const BOOKING: i64 = 42;
pub const CLIENT: i64 = 1001;
pub const STAFF: i64 = 9001;
pub const STRANGER: i64 = 5005;

pub fn client() -> Actor {
    Actor::client(Snowflake::new(CLIENT))
}

pub fn staff() -> Actor {
    Actor::staff(Snowflake::new(STAFF))
}

pub fn stranger() -> Actor {
    Actor::client(Snowflake::new(STRANGER))
}

pub struct Harness {
    pub ctx: ServiceContext,
    pub threads: Arc<InMemoryThreads>,
    pub messages: Arc<InMemoryMessages>,
    pub bookings: Arc<FakeBookings>,
    pub store: Arc<FakeObjectStore>,
    pub queue: Arc<RecordingQueue>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(ChatSettings::default())
    }

    pub fn with_settings(settings: ChatSettings) -> Self {
        let threads = Arc::new(InMemoryThreads::default());
        let messages = Arc::new(InMemoryMessages::backed_by(threads.clone()));
        let bookings = Arc::new(FakeBookings::default());
        let store = Arc::new(FakeObjectStore::default());
        let queue = Arc::new(RecordingQueue::default());
        let sink = Arc::new(RecordingSink::default());

        bookings.add(BOOKING, CLIENT);

        let ctx = ServiceContext::builder()
            .thread_repo(threads.clone())
            .message_repo(messages.clone())
            .bookings(bookings.clone())
            .object_store(store.clone())
            .task_queue(queue.clone())
            .notifications(sink.clone())
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .settings(settings)
            .build()
            .expect("all ports provided");

        Self {
            ctx,
            threads,
            messages,
            bookings,
            store,
            queue,
            sink,
        }
    }
}
