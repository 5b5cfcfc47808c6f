use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::response::{ok, AppError};
use crate::services::llm_provider::{Question, QuestionRequest};
use crate::state::AppState;
use crate::validation::{validate_job_description, validate_required_field, validate_resume_text};

pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(generate_questions))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionsResponse {
    category: String,
    questions: Vec<Question>,
    current_question_index: usize,
}

async fn generate_questions(
    State(state): State<AppState>,
    Json(req): Json<QuestionRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    validate_resume_text(&req.resume_text)
        .map_err(|e| AppError::bad_request("VALIDATION_ERROR", &e))?;
    validate_required_field("jobRole", &req.job_role)
        .map_err(|e| AppError::bad_request("VALIDATION_ERROR", &e))?;
    validate_required_field("company", &req.company)
        .map_err(|e| AppError::bad_request("VALIDATION_ERROR", &e))?;
    validate_required_field("questionType", &req.question_type)
        .map_err(|e| AppError::bad_request("VALIDATION_ERROR", &e))?;
    validate_required_field("experienceLevel", &req.experience_level)
        .map_err(|e| AppError::bad_request("VALIDATION_ERROR", &e))?;
    validate_job_description(&req.job_description)
        .map_err(|e| AppError::bad_request("VALIDATION_ERROR", &e))?;

    let questions = state.llm().generate_questions(&req).await?;

    Ok(ok(QuestionsResponse {
        category: req.question_type,
        questions,
        current_question_index: 0,
    }))
}
