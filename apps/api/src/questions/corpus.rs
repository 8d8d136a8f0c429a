//! Question bank loading from a JSON Lines file.
//!
//! One object per line with `question` and `category` strings and an optional
//! `tags` array. Malformed lines are skipped with a warning; an empty result is
//! an error because the service cannot start without questions.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::questions::QuestionRecord;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read question bank {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no valid questions loaded from {0}")]
    Empty(PathBuf),
}

pub fn load_question_bank(path: &Path) -> Result<Vec<QuestionRecord>, CorpusError> {
    let content = std::fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_question_lines(&content, &path.display().to_string());
    if records.is_empty() {
        return Err(CorpusError::Empty(path.to_path_buf()));
    }

    info!("Loaded {} questions from {}", records.len(), path.display());
    Ok(records)
}

/// Parses JSONL content, skipping blank, malformed, and incomplete lines.
/// A question text seen earlier in the file is dropped; the first record wins.
pub fn parse_question_lines(content: &str, source: &str) -> Vec<QuestionRecord> {
    let mut seen = HashSet::new();
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(i, line)| match serde_json::from_str::<QuestionRecord>(line) {
            Ok(record) if !record.is_well_formed() => {
                warn!("Skipping {source} line {}: blank question or category", i + 1);
                None
            }
            Ok(record) if !seen.insert(record.question.clone()) => {
                warn!("Skipping {source} line {}: duplicate question {:?}", i + 1, record.question);
                None
            }
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping {source} line {}: {e}", i + 1);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_malformed_lines_are_skipped() {
        let content = r#"{"question": "Tell me about yourself.", "category": "introductory"}
not json at all
{"question": "What is an index?", "category": "basics", "tags": ["sql"]}

{"category": "basics"}
{"question": "", "category": "basics"}"#;

        let records = parse_question_lines(content, "test");
        assert_eq!(records.len(), 2);
        assert!(records[0].tags.is_empty(), "tags default to empty");
        assert_eq!(records[1].tags, vec!["sql".to_string()]);
    }

    #[test]
    fn test_duplicate_questions_keep_first_record() {
        let content = r#"{"question": "What is a closure?", "category": "basics", "tags": ["first"]}
{"question": "What is a closure?", "category": "basics", "tags": ["second"]}
{"question": "What is a trait?", "category": "basics"}"#;

        let records = parse_question_lines(content, "test");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tags, vec!["first".to_string()]);
        assert_eq!(records[1].question, "What is a trait?");
    }

    #[test]
    fn test_non_string_tags_reject_the_line() {
        let content = r#"{"question": "Q", "category": "basics", "tags": [1, 2]}"#;
        assert!(parse_question_lines(content, "test").is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"question": "Design a rate limiter.", "category": "problem solving", "tags": ["design"]}}"#
        )
        .unwrap();

        let records = load_question_bank(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "problem solving");
    }

    #[test]
    fn test_file_without_valid_lines_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{broken").unwrap();

        let err = load_question_bank(file.path()).unwrap_err();
        assert!(matches!(err, CorpusError::Empty(_)));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let err = load_question_bank(Path::new("/definitely/not/here.jsonl")).unwrap_err();
        assert!(matches!(err, CorpusError::Read { .. }));
    }
}
