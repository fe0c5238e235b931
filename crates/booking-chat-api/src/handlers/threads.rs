//! Thread handlers

use axum::{
    extract::{Path, State},
    Json,
};
use booking_chat_service::{dto::ThreadResponse, ChatService};

use crate::extractors::{AuthUser, BookingIdPath, ThreadIdPath};
use crate::response::{Accepted, ApiResult};
use crate::state::AppState;

/// Open (or fetch) the booking's chat thread
///
/// POST /bookings/{booking_id}/chat
pub async fn open_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<BookingIdPath>,
) -> ApiResult<Json<ThreadResponse>> {
    let booking_id = path.booking_id()?;

    let service = ChatService::new(state.service_context());
    let thread = service.open_thread(booking_id, &auth.actor).await?;
    Ok(Json(thread))
}

/// Get a thread
///
/// GET /chat/threads/{thread_id}
pub async fn get_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ThreadIdPath>,
) -> ApiResult<Json<ThreadResponse>> {
    let thread_id = path.thread_id()?;

    let service = ChatService::new(state.service_context());
    let thread = service.get_thread(thread_id, &auth.actor).await?;
    Ok(Json(thread))
}

/// Close a thread; the purge runs asynchronously
///
/// POST /chat/threads/{thread_id}/close
pub async fn close_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ThreadIdPath>,
) -> ApiResult<Accepted<Json<ThreadResponse>>> {
    let thread_id = path.thread_id()?;

    let service = ChatService::new(state.service_context());
    let thread = service.close_thread(thread_id, &auth.actor).await?;
    Ok(Accepted(Json(thread)))
}
