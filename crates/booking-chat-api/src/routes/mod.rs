//! Route definitions
//!
//! Chat routes are mounted under /api/v1; health and signed media downloads
//! sit at the root.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{health, media, messages, threads};
use crate::state::AppState;

/// Create the API router (excluding health for separate middleware handling)
///
/// `max_upload_bytes` caps the raw body of media uploads.
pub fn create_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/api/v1", api_v1_routes(max_upload_bytes))
        .route("/media/*key", get(media::download_media))
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/bookings/:booking_id/chat", post(threads::open_thread))
        .merge(thread_routes())
        .route(
            "/chat/threads/:thread_id/media",
            put(media::upload_media).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// Thread routes
fn thread_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/threads/:thread_id", get(threads::get_thread))
        .route("/chat/threads/:thread_id/close", post(threads::close_thread))
        .route(
            "/chat/threads/:thread_id/messages",
            get(messages::list_messages).post(messages::post_message),
        )
}
