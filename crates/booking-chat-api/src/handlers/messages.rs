//! Message handlers

use axum::{
    extract::{Path, State},
    Json,
};
use booking_chat_service::{
    dto::{ListMessagesQuery, MessageResponse, PostMessageRequest},
    ChatService,
};

use crate::extractors::{AuthUser, JsonBody, QueryParams, ThreadIdPath};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// List messages in a thread
///
/// GET /chat/threads/{thread_id}/messages?before=&after=&limit=
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ThreadIdPath>,
    QueryParams(query): QueryParams<ListMessagesQuery>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let thread_id = path.thread_id()?;

    let service = ChatService::new(state.service_context());
    let messages = service.list_messages(thread_id, &auth.actor, query).await?;
    Ok(Json(messages))
}

/// Post a message
///
/// POST /chat/threads/{thread_id}/messages
pub async fn post_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ThreadIdPath>,
    JsonBody(request): JsonBody<PostMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let thread_id = path.thread_id()?;

    let service = ChatService::new(state.service_context());
    let message = service.post_message(thread_id, &auth.actor, request).await?;
    Ok(Created(Json(message)))
}
