//! Service context - dependency container for services
//!
//! Holds the ports the chat use cases and jobs talk to, the id generator,
//! and the chat feature settings.

use std::sync::Arc;
use std::time::Duration;

use booking_chat_common::AppConfig;
use booking_chat_core::{
    BookingLookup, MessageRepository, NotificationSink, ObjectStore, Snowflake,
    SnowflakeGenerator, TaskQueue, ThreadRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Chat switches consumed by the services and the purge job
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub enabled: bool,
    pub signed_url_ttl_secs: u64,
    pub redact_messages: bool,
    pub close_purge_delay: Duration,
    pub storage_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl ChatSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            enabled: config.chat.enabled,
            signed_url_ttl_secs: config.chat.signed_url_ttl_secs,
            redact_messages: config.chat.redact_messages,
            close_purge_delay: config.chat.close_purge_delay(),
            storage_timeout: config.chat.storage_timeout(),
            max_upload_bytes: config.storage.max_file_size_bytes(),
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            signed_url_ttl_secs: 300,
            redact_messages: true,
            close_purge_delay: Duration::ZERO,
            storage_timeout: Duration::from_secs(30),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Service context containing all dependencies
///
/// Cheap to clone; every port sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    thread_repo: Arc<dyn ThreadRepository>,
    message_repo: Arc<dyn MessageRepository>,
    bookings: Arc<dyn BookingLookup>,
    object_store: Arc<dyn ObjectStore>,
    task_queue: Arc<dyn TaskQueue>,
    notifications: Arc<dyn NotificationSink>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    settings: ChatSettings,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn thread_repo(&self) -> &dyn ThreadRepository {
        self.thread_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    // === Collaborators ===

    pub fn bookings(&self) -> &dyn BookingLookup {
        self.bookings.as_ref()
    }

    pub fn object_store(&self) -> &dyn ObjectStore {
        self.object_store.as_ref()
    }

    pub fn task_queue(&self) -> &dyn TaskQueue {
        self.task_queue.as_ref()
    }

    pub fn notifications(&self) -> &dyn NotificationSink {
        self.notifications.as_ref()
    }

    // === Settings ===

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("collaborators", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating a ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    thread_repo: Option<Arc<dyn ThreadRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    bookings: Option<Arc<dyn BookingLookup>>,
    object_store: Option<Arc<dyn ObjectStore>>,
    task_queue: Option<Arc<dyn TaskQueue>>,
    notifications: Option<Arc<dyn NotificationSink>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    settings: ChatSettings,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thread_repo(mut self, repo: Arc<dyn ThreadRepository>) -> Self {
        self.thread_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn bookings(mut self, lookup: Arc<dyn BookingLookup>) -> Self {
        self.bookings = Some(lookup);
        self
    }

    pub fn object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.object_store = Some(store);
        self
    }

    pub fn task_queue(mut self, queue: Arc<dyn TaskQueue>) -> Self {
        self.task_queue = Some(queue);
        self
    }

    pub fn notifications(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notifications = Some(sink);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: ChatSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if any port is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            thread_repo: self.thread_repo.ok_or_else(|| missing("thread_repo"))?,
            message_repo: self.message_repo.ok_or_else(|| missing("message_repo"))?,
            bookings: self.bookings.ok_or_else(|| missing("bookings"))?,
            object_store: self.object_store.ok_or_else(|| missing("object_store"))?,
            task_queue: self.task_queue.ok_or_else(|| missing("task_queue"))?,
            notifications: self.notifications.ok_or_else(|| missing("notifications"))?,
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            settings: self.settings,
        })
    }
}

fn missing(name: &str) -> ServiceError {
    ServiceError::internal(format!("{name} is required"))
}
