//! Test fixtures
//!
//! Request bodies and the response shapes the API returns.

use serde::Deserialize;
use serde_json::{json, Value};

pub fn text_message(text: &str) -> Value {
    json!({ "type": "text", "text": text })
}

pub fn image_message(media_path: &str) -> Value {
    json!({ "type": "image", "media_path": media_path })
}

pub fn location_message(lat: Value, lng: Value) -> Value {
    json!({ "type": "location", "lat": lat, "lng": lng })
}

/// Thread response
#[derive(Debug, Deserialize)]
pub struct ThreadBody {
    pub id: String,
    pub booking_id: String,
    pub client_id: String,
    pub admin_id: Option<String>,
    pub status: String,
    pub opened_at: String,
    pub close_requested_at: Option<String>,
    pub closed_at: Option<String>,
}

/// Message response
#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub id: String,
    pub thread_id: String,
    pub sender_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
    pub media_path: Option<String>,
    pub media_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: String,
}

/// Media upload response
#[derive(Debug, Deserialize)]
pub struct UploadBody {
    pub media_path: String,
    pub url: String,
    pub expires_in: u64,
}

/// Error envelope
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
