//! Thread database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for chat_threads table
#[derive(Debug, Clone, FromRow)]
pub struct ThreadModel {
    pub id: i64,
    pub booking_id: i64,
    pub client_id: i64,
    pub admin_id: Option<i64>,
    pub status: String,
    pub opened_at: DateTime<Utc>,
    pub close_requested_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}
