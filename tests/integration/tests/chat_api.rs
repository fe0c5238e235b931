//! Chat API end-to-end tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL (JWT_SECRET optional)
//!
//! Run with: cargo test -p integration-tests --test chat_api

use std::time::Duration;

use booking_chat_core::Actor;
use integration_tests::{
    assert_json, assert_status, check_test_env, fixtures::*, unique_id, TestServer,
};
use reqwest::StatusCode;
use serde_json::json;

macro_rules! require_env {
    () => {
        if !check_test_env().await {
            return;
        }
    };
}

async fn open(server: &TestServer, booking: &str, actor: &Actor) -> ThreadBody {
    let response = server
        .post_as(&format!("/api/v1/bookings/{booking}/chat"), actor)
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    require_env!();
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/health/ready").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"], "healthy");
    assert_eq!(body["checks"]["redis"], "healthy");
}

// ============================================================================
// Opening threads
// ============================================================================

#[tokio::test]
async fn test_open_is_idempotent_and_records_staff() {
    require_env!();
    let server = TestServer::start().await.unwrap();
    let (booking, client) = server.seed_booking().await.unwrap();
    let booking = booking.to_string();

    let first = open(&server, &booking, &client).await;
    assert_eq!(first.status, "open");
    assert_eq!(first.booking_id, booking);
    assert_eq!(first.client_id, client.id.to_string());
    assert!(first.admin_id.is_none());

    let again = open(&server, &booking, &client).await;
    assert_eq!(again.id, first.id);

    let staff = Actor::staff(unique_id());
    let by_staff = open(&server, &booking, &staff).await;
    assert_eq!(by_staff.id, first.id);
    assert_eq!(by_staff.admin_id, Some(staff.id.to_string()));
}

#[tokio::test]
async fn test_open_rejects_outsiders_and_unknown_bookings() {
    require_env!();
    let server = TestServer::start().await.unwrap();
    let (booking, _) = server.seed_booking().await.unwrap();

    let stranger = Actor::client(unique_id());
    let response = server
        .post_as(&format!("/api/v1/bookings/{booking}/chat"), &stranger)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "FORBIDDEN");

    let response = server
        .post_as(&format!("/api/v1/bookings/{}/chat", unique_id()), &stranger)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body.error.code, "UNKNOWN_BOOKING");
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    require_env!();
    let server = TestServer::start().await.unwrap();

    let response = server
        .client
        .post(format!("{}/api/v1/bookings/1/chat", server.base_url()))
        .send()
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_disabled_chat_refuses_new_threads() {
    require_env!();
    let server = TestServer::start_with(&[("CHAT_ENABLED", "false")])
        .await
        .unwrap();
    let (booking, client) = server.seed_booking().await.unwrap();

    let response = server
        .post_as(&format!("/api/v1/bookings/{booking}/chat"), &client)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::SERVICE_UNAVAILABLE)
        .await
        .unwrap();
    assert_eq!(body.error.code, "CHAT_DISABLED");
}

// ============================================================================
// Messages
// ============================================================================

#[tokio::test]
async fn test_post_and_list_messages() {
    require_env!();
    let server = TestServer::start().await.unwrap();
    let (booking, client) = server.seed_booking().await.unwrap();
    let thread = open(&server, &booking.to_string(), &client).await;
    let messages_path = format!("/api/v1/chat/threads/{}/messages", thread.id);

    let response = server
        .post_json_as(&messages_path, &client, &text_message("Hello"))
        .await
        .unwrap();
    let text: MessageBody = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(text.kind, "text");
    assert_eq!(text.text.as_deref(), Some("Hello"));
    assert_eq!(text.sender_id, client.id.to_string());

    let response = server
        .post_json_as(
            &messages_path,
            &client,
            &location_message(json!("52.52"), json!(13.40)),
        )
        .await
        .unwrap();
    let location: MessageBody = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(location.latitude, Some(52.52));
    assert_eq!(location.longitude, Some(13.40));

    let response = server.get_as(&messages_path, &client).await.unwrap();
    let listed: Vec<MessageBody> = assert_json(response, StatusCode::OK).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec![text.id.as_str(), location.id.as_str()]);
}

#[tokio::test]
async fn test_invalid_messages_report_the_reason() {
    require_env!();
    let server = TestServer::start().await.unwrap();
    let (booking, client) = server.seed_booking().await.unwrap();
    let thread = open(&server, &booking.to_string(), &client).await;
    let messages_path = format!("/api/v1/chat/threads/{}/messages", thread.id);

    let cases = [
        (text_message("   "), "Text is required"),
        (
            location_message(json!(91), json!(0)),
            "Invalid coordinates",
        ),
        (json!({ "type": "video" }), "Invalid message type"),
        (json!({ "type": 5 }), "Invalid message type"),
        (json!({ "type": "text", "text": 123 }), "Text is required"),
        (
            image_message("chat-media/1/someone-else.png"),
            "Invalid media path for this thread",
        ),
    ];

    for (body, reason) in cases {
        let response = server
            .post_json_as(&messages_path, &client, &body)
            .await
            .unwrap();
        let error: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
        assert_eq!(error.error.code, "VALIDATION_ERROR");
        assert_eq!(error.error.message, reason);
    }

    let response = server.get_as(&messages_path, &client).await.unwrap();
    let listed: Vec<MessageBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_outsider_cannot_read_or_post() {
    require_env!();
    let server = TestServer::start().await.unwrap();
    let (booking, client) = server.seed_booking().await.unwrap();
    let thread = open(&server, &booking.to_string(), &client).await;
    let stranger = Actor::client(unique_id());

    let response = server
        .get_as(&format!("/api/v1/chat/threads/{}", thread.id), &stranger)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .post_json_as(
            &format!("/api/v1/chat/threads/{}/messages", thread.id),
            &stranger,
            &text_message("hi"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Media
// ============================================================================

#[tokio::test]
async fn test_upload_post_and_download_image() {
    require_env!();
    let server = TestServer::start().await.unwrap();
    let (booking, client) = server.seed_booking().await.unwrap();
    let thread = open(&server, &booking.to_string(), &client).await;

    let response = server
        .put_bytes_as(
            &format!("/api/v1/chat/threads/{}/media?filename=photo.jpg", thread.id),
            &client,
            b"jpeg-bytes".to_vec(),
        )
        .await
        .unwrap();
    let upload: UploadBody = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(upload
        .media_path
        .starts_with(&format!("chat-media/{}/", thread.id)));
    assert_eq!(upload.expires_in, 300);

    let response = server
        .post_json_as(
            &format!("/api/v1/chat/threads/{}/messages", thread.id),
            &client,
            &image_message(&upload.media_path),
        )
        .await
        .unwrap();
    let image: MessageBody = assert_json(response, StatusCode::CREATED).await.unwrap();
    let url = image.media_url.expect("image message carries a signed URL");

    let response = server.get(&url).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"jpeg-bytes");

    // Tampered token
    let response = server.get(&format!("{url}x")).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_upload_rejects_bad_input() {
    require_env!();
    let server = TestServer::start_with(&[("MAX_FILE_SIZE_MB", "1")])
        .await
        .unwrap();
    let (booking, client) = server.seed_booking().await.unwrap();
    let thread = open(&server, &booking.to_string(), &client).await;
    let media = |name: &str| format!("/api/v1/chat/threads/{}/media?filename={name}", thread.id);

    let response = server
        .put_bytes_as(&media("..%2Fescape.png"), &client, b"x".to_vec())
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .put_bytes_as(&media("empty.png"), &client, Vec::new())
        .await
        .unwrap();
    let error: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error.error.message, "File is empty");

    let response = server
        .put_bytes_as(&media("big.png"), &client, vec![0u8; 1024 * 1024 + 1])
        .await
        .unwrap();
    let error: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error.error.message, "File exceeds the 1 MB limit");
}

// ============================================================================
// Closing and purging
// ============================================================================

#[tokio::test]
async fn test_close_then_purge_redacts_and_deletes_media() {
    require_env!();
    let server = TestServer::start().await.unwrap();
    let (booking, client) = server.seed_booking().await.unwrap();
    let staff = Actor::staff(unique_id());
    let thread = open(&server, &booking.to_string(), &client).await;
    let thread_path = format!("/api/v1/chat/threads/{}", thread.id);

    let response = server
        .put_bytes_as(
            &format!("{thread_path}/media?filename=receipt.png"),
            &client,
            b"png".to_vec(),
        )
        .await
        .unwrap();
    let upload: UploadBody = assert_json(response, StatusCode::CREATED).await.unwrap();
    server
        .post_json_as(
            &format!("{thread_path}/messages"),
            &client,
            &image_message(&upload.media_path),
        )
        .await
        .unwrap();
    server
        .post_json_as(&format!("{thread_path}/messages"), &staff, &text_message("Done"))
        .await
        .unwrap();

    let response = server
        .post_as(&format!("{thread_path}/close"), &staff)
        .await
        .unwrap();
    let closing: ThreadBody = assert_json(response, StatusCode::ACCEPTED).await.unwrap();
    assert_eq!(closing.status, "closing");
    assert!(closing.close_requested_at.is_some());
    assert!(closing.closed_at.is_none());

    // Closing twice is harmless
    let response = server
        .post_as(&format!("{thread_path}/close"), &client)
        .await
        .unwrap();
    let again: ThreadBody = assert_json(response, StatusCode::ACCEPTED).await.unwrap();
    assert_ne!(again.status, "open");

    let response = server
        .post_json_as(&format!("{thread_path}/messages"), &client, &text_message("late"))
        .await
        .unwrap();
    let error: ErrorBody = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(error.error.code, "THREAD_CLOSED");

    let (srv, path, who) = (&server, thread_path.as_str(), &client);
    let closed = server
        .run_worker_until(Duration::from_secs(15), move || async move {
            let Ok(response) = srv.get_as(path, who).await else {
                return false;
            };
            response
                .json::<ThreadBody>()
                .await
                .is_ok_and(|t| t.status == "closed")
        })
        .await
        .unwrap();
    assert!(closed, "purge job did not close the thread in time");

    let response = server.get_as(&thread_path, &client).await.unwrap();
    let thread: ThreadBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(thread.closed_at.is_some());

    let response = server
        .get_as(&format!("{thread_path}/messages"), &client)
        .await
        .unwrap();
    let messages: Vec<MessageBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(messages.len(), 2);
    for message in &messages {
        assert!(message.text.is_none());
        assert!(message.media_path.is_none());
        assert!(message.media_url.is_none());
    }

    // The object is gone even for a still-valid link
    let response = server.get(&upload.url).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}
