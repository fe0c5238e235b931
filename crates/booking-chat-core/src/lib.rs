//! # booking-chat-core
//!
//! Domain layer for per-booking chat: threads, messages, media path rules,
//! domain events, and the ports the rest of the workspace implements.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Actor, Booking, Message, MessageContent, MessageType, Thread, ThreadStatus};
pub use error::{DomainError, ValidationReason};
pub use events::DomainEvent;
pub use traits::{
    BookingLookup, MessageQuery, MessageRepository, NotificationSink, ObjectStore, RepoResult,
    TaskQueue, ThreadRepository,
};
pub use value_objects::{
    is_valid_media_path, GeoPoint, MediaPath, Snowflake, SnowflakeGenerator, SnowflakeParseError,
    MEDIA_NAMESPACE,
};
