//! Message entity - one unit of communication in a thread
//!
//! Content is a tagged union at the domain boundary ([`MessageContent`]) and
//! flattened into nullable columns on [`Message`] for storage. Exactly the
//! columns matching `kind` are populated, or none once redacted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::{GeoPoint, MediaPath, Snowflake};

/// Message type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Location,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "location" => Ok(Self::Location),
            other => Err(format!("unknown message type: {other}")),
        }
    }
}

/// Validated message payload
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Image(MediaPath),
    Location(GeoPoint),
}

impl MessageContent {
    pub fn kind(&self) -> MessageType {
        match self {
            Self::Text(_) => MessageType::Text,
            Self::Image(_) => MessageType::Image,
            Self::Location(_) => MessageType::Location,
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Snowflake,
    pub thread_id: Snowflake,
    pub sender_id: Snowflake,
    pub kind: MessageType,
    pub text: Option<String>,
    pub media_path: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new Message with only the columns for `content` populated
    pub fn new(
        id: Snowflake,
        thread_id: Snowflake,
        sender_id: Snowflake,
        content: MessageContent,
    ) -> Self {
        let mut message = Self {
            id,
            thread_id,
            sender_id,
            kind: content.kind(),
            text: None,
            media_path: None,
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
        };
        match content {
            MessageContent::Text(text) => message.text = Some(text),
            MessageContent::Image(path) => message.media_path = Some(path.into_inner()),
            MessageContent::Location(point) => {
                message.latitude = Some(point.latitude());
                message.longitude = Some(point.longitude());
            }
        }
        message
    }

    /// Rebuild the tagged payload; `None` once redacted
    pub fn content(&self) -> Option<MessageContent> {
        match self.kind {
            MessageType::Text => self.text.clone().map(MessageContent::Text),
            MessageType::Image => self
                .media_path
                .as_deref()
                .and_then(MediaPath::parse)
                .map(MessageContent::Image),
            MessageType::Location => match (self.latitude, self.longitude) {
                (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).map(MessageContent::Location),
                _ => None,
            },
        }
    }

    /// Null every content column, keeping id, thread, sender, kind and timestamp
    pub fn redact(&mut self) {
        self.text = None;
        self.media_path = None;
        self.latitude = None;
        self.longitude = None;
    }

    pub fn is_redacted(&self) -> bool {
        self.text.is_none()
            && self.media_path.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }

    /// Exactly the columns for `kind` are set, or none at all
    pub fn has_exclusive_payload(&self) -> bool {
        let text = self.text.is_some();
        let media = self.media_path.is_some();
        let location = self.latitude.is_some() && self.longitude.is_some();
        let partial_location = self.latitude.is_some() != self.longitude.is_some();
        if partial_location {
            return false;
        }
        match self.kind {
            MessageType::Text => !media && !location,
            MessageType::Image => !text && !location,
            MessageType::Location => !text && !media,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (Snowflake, Snowflake, Snowflake) {
        (Snowflake::new(1), Snowflake::new(7), Snowflake::new(100))
    }

    #[test]
    fn test_text_message_columns() {
        let (id, thread, sender) = ids();
        let msg = Message::new(id, thread, sender, MessageContent::Text("hello".into()));
        assert_eq!(msg.kind, MessageType::Text);
        assert_eq!(msg.text.as_deref(), Some("hello"));
        assert!(msg.media_path.is_none() && msg.latitude.is_none() && msg.longitude.is_none());
        assert!(msg.has_exclusive_payload());
    }

    #[test]
    fn test_image_message_columns() {
        let (id, thread, sender) = ids();
        let path = MediaPath::new(thread, "a.jpg").unwrap();
        let msg = Message::new(id, thread, sender, MessageContent::Image(path.clone()));
        assert_eq!(msg.media_path.as_deref(), Some("chat-media/7/a.jpg"));
        assert!(msg.text.is_none());
        assert_eq!(msg.content(), Some(MessageContent::Image(path)));
    }

    #[test]
    fn test_location_message_columns() {
        let (id, thread, sender) = ids();
        let point = GeoPoint::new(-33.86, 151.21).unwrap();
        let msg = Message::new(id, thread, sender, MessageContent::Location(point));
        assert_eq!(msg.latitude, Some(-33.86));
        assert_eq!(msg.longitude, Some(151.21));
        assert!(msg.text.is_none() && msg.media_path.is_none());
        assert!(msg.has_exclusive_payload());
    }

    #[test]
    fn test_redact_keeps_metadata() {
        let (id, thread, sender) = ids();
        let mut msg = Message::new(id, thread, sender, MessageContent::Text("secret".into()));
        let created_at = msg.created_at;
        msg.redact();
        assert!(msg.is_redacted());
        assert!(msg.has_exclusive_payload());
        assert_eq!(msg.content(), None);
        assert_eq!((msg.id, msg.thread_id, msg.sender_id), (id, thread, sender));
        assert_eq!(msg.kind, MessageType::Text);
        assert_eq!(msg.created_at, created_at);
    }

    #[test]
    fn test_mixed_payload_is_detected() {
        let (id, thread, sender) = ids();
        let mut msg = Message::new(id, thread, sender, MessageContent::Text("x".into()));
        msg.media_path = Some("chat-media/7/a.jpg".into());
        assert!(!msg.has_exclusive_payload());

        msg.media_path = None;
        msg.latitude = Some(1.0);
        assert!(!msg.has_exclusive_payload());
    }

    #[test]
    fn test_message_type_parse() {
        assert_eq!("image".parse::<MessageType>().unwrap(), MessageType::Image);
        assert!("invalid".parse::<MessageType>().is_err());
        assert!("Text".parse::<MessageType>().is_err());
    }
}
