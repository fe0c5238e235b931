//! Media handlers
//!
//! Uploads go through the chat service; downloads are served straight from
//! the object store once the signed token checks out.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use booking_chat_common::AppError;
use booking_chat_core::{DomainError, MediaPath};
use booking_chat_service::{
    dto::{MediaUploadResponse, UploadMediaQuery},
    ChatService, ServiceError,
};
use booking_chat_storage::SignedUrlError;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::extractors::{AuthUser, QueryParams, ThreadIdPath};
use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

/// Upload a file into the thread's media namespace
///
/// PUT /chat/threads/{thread_id}/media?filename=
pub async fn upload_media(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ThreadIdPath>,
    QueryParams(query): QueryParams<UploadMediaQuery>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Created<Json<MediaUploadResponse>>> {
    let thread_id = path.thread_id()?;

    let bytes = body.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            let max = state.service_context().settings().max_upload_bytes;
            ApiError::from(ServiceError::validation(format!(
                "File exceeds the {} MB limit",
                max / (1024 * 1024)
            )))
        } else {
            ApiError::invalid_body(e.body_text())
        }
    })?;

    let service = ChatService::new(state.service_context());
    let upload = service
        .upload_media(thread_id, &auth.actor, query, bytes.to_vec())
        .await?;
    Ok(Created(Json(upload)))
}

#[derive(Debug, Deserialize)]
pub struct MediaTokenQuery {
    pub token: Option<String>,
}

/// Download an object through a signed link
///
/// GET /media/{key}?token=
pub async fn download_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
    QueryParams(query): QueryParams<MediaTokenQuery>,
) -> ApiResult<impl IntoResponse> {
    let path = MediaPath::parse(&key).ok_or_else(|| DomainError::MediaNotFound(key.clone()))?;
    let token = query.token.ok_or(ApiError::MissingAuth)?;

    state
        .media_store()
        .verify(&token, &path)
        .map_err(|e| match e {
            SignedUrlError::Expired => ApiError::App(AppError::TokenExpired),
            SignedUrlError::Invalid | SignedUrlError::PathMismatch => {
                warn!(path = %path, reason = %e, "Rejected media download");
                ApiError::InvalidMediaToken
            }
            SignedUrlError::Signing => ApiError::internal(e),
        })?;

    let bytes = state.media_store().read(&path).await?;
    debug!(path = %path, size = bytes.len(), "Serving media");

    let max_age = state.service_context().settings().signed_url_ttl_secs;
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(path.file_name()).to_string()),
            (header::CACHE_CONTROL, format!("private, max-age={max_age}")),
        ],
        bytes,
    ))
}

/// Content type from the object's extension
fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
