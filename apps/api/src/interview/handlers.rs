//! Axum route handlers for the Interview API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::feedback::{request_feedback, FeedbackResponse, UserAnswer};
use crate::interview::models::{FinalQuestion, InterviewRequest};
use crate::resume::ResumeUpload;
use crate::state::AppState;

/// Longest accepted job description, in characters.
pub const MAX_JD_CHARS: usize = 10_000;

/// POST /conduct_interview/
///
/// Multipart form with `file` (JSONL or PDF résumé) and `jd` (job description).
/// Returns three questions per phase, in phase order.
pub async fn handle_conduct_interview(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<FinalQuestion>>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("conduct_interview", %request_id);

    async move {
        let (upload, jd) = read_interview_form(multipart).await?;
        let request = InterviewRequest {
            resume: upload.extract_text().await?,
            job_description: validate_job_description(jd)?,
        };
        info!("Conducting interview for upload {}", upload.file_name);

        let questions = state.orchestrator.conduct(&request).await?;
        Ok::<_, AppError>(Json(questions))
    }
    .instrument(span)
    .await
}

/// POST /feedback/
///
/// Critiques a candidate's answer to one interview question.
pub async fn handle_feedback(
    State(state): State<AppState>,
    Json(answer): Json<UserAnswer>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let response = request_feedback(&state.llm, &answer).await?;
    Ok(Json(response))
}

async fn read_interview_form(
    mut multipart: Multipart,
) -> Result<(ResumeUpload, String), AppError> {
    let mut upload = None;
    let mut jd = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                upload = Some(ResumeUpload {
                    file_name,
                    content_type,
                    content,
                });
            }
            Some("jd") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read jd: {e}")))?;
                jd = Some(text);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("Missing form field 'file'".to_string()))?;
    let jd = jd.ok_or_else(|| AppError::Validation("Missing form field 'jd'".to_string()))?;
    Ok((upload, jd))
}

fn validate_job_description(jd: String) -> Result<String, AppError> {
    if jd.trim().is_empty() {
        return Err(AppError::Validation("jd cannot be empty".to_string()));
    }
    let chars = jd.chars().count();
    if chars > MAX_JD_CHARS {
        return Err(AppError::Validation(format!(
            "jd must be at most {MAX_JD_CHARS} characters, got {chars}"
        )));
    }
    Ok(jd)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
