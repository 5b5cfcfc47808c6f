use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_FRAME_BYTES;
use crate::response::{created, ok, AppError};
use crate::services::llm_provider::Question;
use crate::sessions::RegistryError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", delete(end_session))
        .route("/sessions/:id/frames", post(submit_frame))
        .route("/sessions/:id/metrics", get(session_metrics))
        .route("/sessions/:id/question", get(current_question))
        .route("/sessions/:id/advance", post(advance_question))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    session_id: String,
    created_at: DateTime<Utc>,
    question_count: usize,
}

async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let Json(req) = body.unwrap_or_default();

    let analyzer = state.new_analyzer();
    let question_count = req.questions.len();
    let session_id = state
        .sessions()
        .create(analyzer, req.questions)
        .await
        .map_err(|e| match e {
            RegistryError::CapacityReached(max) => AppError::conflict(
                "SESSION_CAPACITY",
                &format!("Session capacity reached ({max}), end an interview first"),
            ),
        })?;

    Ok(created(CreateSessionResponse {
        session_id,
        created_at: Utc::now(),
        question_count,
    }))
}

async fn end_session(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if !state.sessions().remove(&id).await {
        return Err(AppError::not_found("Session not found"));
    }
    Ok(ok(serde_json::json!({ "removed": true })))
}

/// 帧提交：请求体为原始图像字节（octet-stream）。
/// 单帧解码失败返回中性结果而不是错误——对 UI 是一次波动，不是故障。
async fn submit_frame(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if body.is_empty() {
        return Err(AppError::bad_request("EMPTY_FRAME", "Frame body is empty"));
    }
    if body.len() > MAX_FRAME_BYTES {
        return Err(AppError::payload_too_large("Frame exceeds 2 MiB limit"));
    }

    let slot = state
        .sessions()
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    // 会话级互斥：帧在同一会话内严格串行
    let mut session = slot.lock().await;
    session.touch();
    let result = session.analyzer.analyze_frame(&body).await;

    Ok(ok(result))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsResponse {
    engagement_score: f64,
    positivity_score: f64,
    timestamp: DateTime<Utc>,
}

async fn session_metrics(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let slot = state
        .sessions()
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    let session = slot.lock().await;
    let (engagement_score, positivity_score) = session.analyzer.smoothed_scores();

    Ok(ok(MetricsResponse {
        engagement_score,
        positivity_score,
        timestamp: Utc::now(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionProgress {
    question: Option<Question>,
    index: usize,
    total: usize,
    finished: bool,
}

async fn current_question(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let slot = state
        .sessions()
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    let session = slot.lock().await;
    Ok(ok(QuestionProgress {
        question: session.current_question().cloned(),
        index: session.current_question,
        total: session.questions.len(),
        finished: session.current_question >= session.questions.len(),
    }))
}

async fn advance_question(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let slot = state
        .sessions()
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    let mut session = slot.lock().await;
    session.touch();
    let index = session.advance();

    Ok(ok(QuestionProgress {
        question: session.current_question().cloned(),
        index,
        total: session.questions.len(),
        finished: index >= session.questions.len(),
    }))
}
