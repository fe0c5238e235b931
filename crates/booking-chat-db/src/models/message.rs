//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for chat_messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub thread_id: i64,
    pub sender_id: i64,
    pub message_type: String,
    pub text: Option<String>,
    pub media_path: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl MessageModel {
    #[inline]
    pub fn is_redacted(&self) -> bool {
        self.text.is_none()
            && self.media_path.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}
