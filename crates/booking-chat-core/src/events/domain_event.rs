//! Domain events - fanned out to thread participants and staff dashboards
//!
//! Payloads carry ids, the message type and stored content fields. They never
//! carry signed URLs or storage credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Message, MessageType, Thread};
use crate::value_objects::Snowflake;

/// All chat domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    MessageCreated(MessageCreatedEvent),
    ThreadClosed(ThreadClosedEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageCreated(_) => "CHAT_MESSAGE_CREATED",
            Self::ThreadClosed(_) => "CHAT_THREAD_CLOSED",
        }
    }

    pub fn thread_id(&self) -> Snowflake {
        match self {
            Self::MessageCreated(e) => e.thread_id,
            Self::ThreadClosed(e) => e.thread_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MessageCreated(e) => e.timestamp,
            Self::ThreadClosed(e) => e.timestamp,
        }
    }

    pub fn message_created(message: &Message) -> Self {
        Self::MessageCreated(MessageCreatedEvent {
            thread_id: message.thread_id,
            message_id: message.id,
            sender_id: message.sender_id,
            message_type: message.kind,
            text: message.text.clone(),
            media_path: message.media_path.clone(),
            latitude: message.latitude,
            longitude: message.longitude,
            timestamp: message.created_at,
        })
    }

    pub fn thread_closed(thread: &Thread, closed_by: Snowflake) -> Self {
        Self::ThreadClosed(ThreadClosedEvent {
            thread_id: thread.id,
            booking_id: thread.booking_id,
            closed_by,
            timestamp: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreatedEvent {
    pub thread_id: Snowflake,
    pub message_id: Snowflake,
    pub sender_id: Snowflake,
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadClosedEvent {
    pub thread_id: Snowflake,
    pub booking_id: Snowflake,
    pub closed_by: Snowflake,
    pub timestamp: DateTime<Utc>,
}
