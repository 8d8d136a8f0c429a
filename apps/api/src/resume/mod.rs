//! Résumé upload parsing.
//!
//! Accepts JSON Lines (first record is the résumé) or PDF (all extracted
//! text). Every failure here is the caller's fault and maps to a 400.

use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

const JSONL_CONTENT_TYPES: &[&str] = &[
    "application/jsonl",
    "application/x-jsonlines",
    "application/x-ndjson",
    "application/json-lines",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Jsonl,
    Pdf,
}

impl ResumeFormat {
    /// Detects the format from the file extension, then the declared content type.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".jsonl") {
            return Some(ResumeFormat::Jsonl);
        }
        if lower.ends_with(".pdf") {
            return Some(ResumeFormat::Pdf);
        }

        let mime = content_type?.split(';').next()?.trim().to_ascii_lowercase();
        if mime == "application/pdf" {
            Some(ResumeFormat::Pdf)
        } else if JSONL_CONTENT_TYPES.contains(&mime.as_str()) {
            Some(ResumeFormat::Jsonl)
        } else {
            None
        }
    }
}

/// The `file` part of an interview upload.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Bytes,
}

impl ResumeUpload {
    /// Validates the upload and returns the résumé text used for retrieval and prompting.
    /// PDF parsing is CPU-bound and runs on the blocking pool.
    pub async fn extract_text(&self) -> Result<String, AppError> {
        let format = ResumeFormat::detect(&self.file_name, self.content_type.as_deref())
            .ok_or_else(|| AppError::Validation("File must be in JSONL or PDF format".to_string()))?;

        let text = match format {
            ResumeFormat::Jsonl => jsonl_resume_text(&self.content)?,
            ResumeFormat::Pdf => {
                let content = self.content.clone();
                tokio::task::spawn_blocking(move || pdf_resume_text(&content))
                    .await
                    .map_err(|e| AppError::Validation(format!("Error processing PDF: {e}")))??
            }
        };

        if text.trim().is_empty() {
            return Err(AppError::Validation("Resume content is empty".to_string()));
        }
        debug!("Extracted {} chars of resume text from {}", text.len(), self.file_name);
        Ok(text)
    }
}

/// Validates every non-blank line and returns the first record, re-serialized.
fn jsonl_resume_text(content: &[u8]) -> Result<String, AppError> {
    let text = std::str::from_utf8(content)
        .map_err(|_| AppError::Validation("Resume file must be UTF-8 encoded".to_string()))?;

    let records = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str::<serde_json::Value>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| AppError::Validation("Invalid JSONL format".to_string()))?;

    let first = records.into_iter().next().ok_or_else(|| {
        AppError::Validation("Invalid resume file: no valid data".to_string())
    })?;

    serde_json::to_string(&first).map_err(|e| AppError::Internal(e.into()))
}

fn pdf_resume_text(content: &[u8]) -> Result<String, AppError> {
    let text = pdf_extract::extract_text_from_mem(content)
        .map_err(|e| AppError::Validation(format!("Error processing PDF: {e}")))?;

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "PDF resume is empty or contains no valid text".to_string(),
        ));
    }
    Ok(text)
}
