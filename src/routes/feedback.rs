use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::validation::validate_feedback_input;

pub fn router() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze_response))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackRequest {
    question: String,
    response: String,
}

async fn analyze_response(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    validate_feedback_input(&req.question, &req.response)
        .map_err(|e| AppError::bad_request("VALIDATION_ERROR", &e))?;

    let feedback = state.llm().analyze_response(&req.question, &req.response).await?;

    Ok(ok(feedback))
}
