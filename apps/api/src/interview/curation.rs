//! Parsing of untrusted curator output.
//!
//! The model is asked for a bare JSON array but frequently wraps it in prose or
//! code fences. `extract_json_array` isolates the outermost `[ ... ]` region;
//! `parse_curation` then validates it strictly and rejects on any mismatch.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::interview::models::CurationCandidate;
use crate::llm_client::LlmError;

/// Why a curator round was discarded. Every variant triggers the sampling fallback.
#[derive(Debug, Error)]
pub enum CurationError {
    #[error("curator call failed: {0}")]
    Call(#[from] LlmError),

    #[error("curator did not answer within {0:?}")]
    TimedOut(Duration),

    #[error("curator returned an empty response")]
    Empty,

    #[error("no JSON array found in curator response")]
    MissingArray,

    #[error("curator response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected} selections, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("selection {0} lacks a string original_question or enhanced_question")]
    MalformedEntry(usize),
}

/// Returns the slice from the first `[` through the last `]`, if that region exists.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

/// Parses curator output into exactly `expected` candidates.
pub fn parse_curation(raw: &str, expected: usize) -> Result<Vec<CurationCandidate>, CurationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(CurationError::Empty);
    }

    let array = extract_json_array(text).ok_or(CurationError::MissingArray)?;
    let entries = match serde_json::from_str::<Value>(array)? {
        Value::Array(entries) => entries,
        _ => return Err(CurationError::MissingArray),
    };

    if entries.len() != expected {
        return Err(CurationError::WrongCount {
            expected,
            actual: entries.len(),
        });
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let field = |name: &str| entry.get(name).and_then(Value::as_str).map(str::to_string);
            match (field("original_question"), field("enhanced_question")) {
                (Some(original_question), Some(enhanced_question)) => Ok(CurationCandidate {
                    original_question,
                    enhanced_question,
                }),
                _ => Err(CurationError::MalformedEntry(i)),
            }
        })
        .collect()
}
