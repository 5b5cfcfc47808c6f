mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::app::spawn_test_app;
use common::http::{request, response_json};

#[tokio::test]
async fn it_sse_for_unknown_session_is_404() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::GET,
        "/api/realtime/sessions/missing/events",
        None,
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn it_sse_stream_opens_for_live_session() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/interview/sessions",
        Some(json!({ "questions": [] })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["sessionId"].as_str().unwrap();

    // 只验证流成功建立；消费无限流不适合 oneshot 测试
    let resp = request(
        &app.app,
        Method::GET,
        &format!("/api/realtime/sessions/{id}/events"),
        None,
        &[],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.contains("text/event-stream"));
}
