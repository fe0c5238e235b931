//! Request DTOs for API endpoints

use serde::Deserialize;
use serde_json::value::{to_raw_value, RawValue};
use serde_json::Value;
use validator::{Validate, ValidationError};

use booking_chat_core::{
    GeoPoint, MediaPath, MessageContent, MessageQuery, MessageType, Snowflake, ValidationReason,
};

// ============================================================================
// Message Requests
// ============================================================================

/// Post message request
///
/// Every payload field is loosely typed on the wire so that a wrong JSON type
/// surfaces as the matching validation reason, after authorization, rather
/// than as a body rejection. [`PostMessageRequest::into_content`] decides
/// which fields the declared `type` requires.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostMessageRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,

    #[serde(default)]
    pub text: Option<Value>,

    #[serde(default)]
    pub media_path: Option<Value>,

    /// Number or numeric string, kept as raw JSON: literals such as `1e400`
    /// do not fit a `Value` and must still reach validation
    #[serde(default, alias = "latitude")]
    pub lat: Option<Box<RawValue>>,

    #[serde(default, alias = "longitude")]
    pub lng: Option<Box<RawValue>>,
}

impl PostMessageRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: Some(MessageType::Text.as_str().into()),
            text: Some(Value::String(text.into())),
            ..Self::default()
        }
    }

    pub fn image(media_path: impl Into<String>) -> Self {
        Self {
            kind: Some(MessageType::Image.as_str().into()),
            media_path: Some(Value::String(media_path.into())),
            ..Self::default()
        }
    }

    pub fn location(lat: impl Into<Value>, lng: impl Into<Value>) -> Self {
        Self {
            kind: Some(MessageType::Location.as_str().into()),
            lat: to_raw_value(&lat.into()).ok(),
            lng: to_raw_value(&lng.into()).ok(),
            ..Self::default()
        }
    }

    /// The `type` field when it is a string
    pub fn declared_type(&self) -> Option<&str> {
        self.kind.as_ref().and_then(Value::as_str)
    }

    /// Validate against the declared type and keep only the matching payload
    pub fn into_content(self, thread_id: Snowflake) -> Result<MessageContent, ValidationReason> {
        let kind: MessageType = self
            .declared_type()
            .and_then(|kind| kind.parse().ok())
            .ok_or(ValidationReason::InvalidMessageType)?;

        match kind {
            MessageType::Text => self
                .text
                .as_ref()
                .and_then(Value::as_str)
                .filter(|t| !t.trim().is_empty())
                .map(|t| MessageContent::Text(t.to_string()))
                .ok_or(ValidationReason::MissingText),
            MessageType::Image => self
                .media_path
                .as_ref()
                .and_then(Value::as_str)
                .and_then(|p| MediaPath::for_thread(thread_id, p))
                .map(MessageContent::Image)
                .ok_or(ValidationReason::InvalidMediaPath),
            MessageType::Location => {
                let lat = self.lat.as_deref().and_then(coordinate);
                let lng = self.lng.as_deref().and_then(coordinate);
                lat.zip(lng)
                    .and_then(|(lat, lng)| GeoPoint::new(lat, lng))
                    .map(MessageContent::Location)
                    .ok_or(ValidationReason::InvalidCoordinates)
            }
        }
    }
}

fn coordinate(raw: &RawValue) -> Option<f64> {
    // Out-of-range numbers fail to parse here and count as invalid
    match serde_json::from_str::<Value>(raw.get()).ok()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Cursor pagination for message listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMessagesQuery {
    pub before: Option<Snowflake>,
    pub after: Option<Snowflake>,
    pub limit: Option<i64>,
}

impl ListMessagesQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 100;

    pub fn to_query(&self) -> MessageQuery {
        MessageQuery {
            before: self.before,
            after: self.after,
            limit: self
                .limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }
}

// ============================================================================
// Media Requests
// ============================================================================

/// Query string of a raw-body media upload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UploadMediaQuery {
    #[validate(
        length(min = 1, max = 128, message = "Filename must be 1-128 characters"),
        custom(function = "validate_filename")
    )]
    pub filename: String,
}

impl UploadMediaQuery {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

fn validate_filename(name: &str) -> Result<(), ValidationError> {
    let allowed = name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'));
    if !allowed || name.starts_with('.') {
        let mut err = ValidationError::new("filename");
        err.message = Some("Filename may only contain letters, digits, '.', '-' and '_'".into());
        return Err(err);
    }
    Ok(())
}
