//! Mock-interview answer feedback.
//!
//! Unlike curation there is no fallback here: without the model there is no
//! feedback to give, so failures surface as `AppError::Llm`.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::prompts::{render, FEEDBACK_PROMPT_TEMPLATE};
use crate::llm_client::prompts::PLAIN_TEXT_SYSTEM;
use crate::llm_client::LlmClient;

/// A candidate's answer to one generated question.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAnswer {
    pub question: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub user_answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

pub async fn request_feedback(
    llm: &LlmClient,
    answer: &UserAnswer,
) -> Result<FeedbackResponse, AppError> {
    let prompt = build_feedback_prompt(answer)?;
    let feedback = llm
        .call_text(&prompt, PLAIN_TEXT_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Feedback LLM call failed: {e}")))?;

    Ok(FeedbackResponse { feedback })
}

fn build_feedback_prompt(answer: &UserAnswer) -> Result<String, AppError> {
    if answer.question.trim().is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }
    if answer.user_answer.trim().is_empty() {
        return Err(AppError::Validation("user_answer cannot be empty".to_string()));
    }

    let tags = if answer.tags.is_empty() {
        "none".to_string()
    } else {
        answer.tags.join(", ")
    };

    Ok(render(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("question", answer.question.as_str()),
            ("category", answer.category.as_str()),
            ("tags", tags.as_str()),
            ("user_answer", answer.user_answer.as_str()),
        ],
    ))
}
