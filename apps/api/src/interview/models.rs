use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::questions::{Phase, QuestionRecord};

/// Questions produced per phase.
pub const QUESTIONS_PER_PHASE: usize = 3;

/// Inputs for one interview, already validated at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct InterviewRequest {
    pub resume: String,
    pub job_description: String,
}

impl InterviewRequest {
    /// Combined relevance signal sent to the similarity index.
    pub fn relevance_query(&self) -> String {
        format!("{}\n{}", self.resume, self.job_description)
    }
}

/// A curator pick: the verbatim bank question plus the text shown to the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationCandidate {
    pub original_question: String,
    pub enhanced_question: String,
}

impl CurationCandidate {
    /// Uses the bank question unchanged. Built by the random-sampling fallback.
    pub fn verbatim(record: &QuestionRecord) -> Self {
        Self {
            original_question: record.question.clone(),
            enhanced_question: record.question.clone(),
        }
    }
}

/// One entry of the interview response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalQuestion {
    pub question: String,
    pub category: String,
    pub tags: Vec<String>,
    pub phase: String,
}

/// Per-request state threaded through every phase.
///
/// Holds the original text of every question already assigned. Grows
/// monotonically and is dropped with the request.
#[derive(Debug, Default)]
pub struct InterviewContext {
    used_questions: HashSet<String>,
}

impl InterviewContext {
    pub fn is_used(&self, original_question: &str) -> bool {
        self.used_questions.contains(original_question)
    }

    pub fn mark_used(&mut self, original_question: &str) {
        self.used_questions.insert(original_question.to_string());
    }

    pub fn used_count(&self) -> usize {
        self.used_questions.len()
    }

    /// Used questions in a stable order, for prompt rendering.
    pub fn used_sorted(&self) -> Vec<&str> {
        let mut used: Vec<&str> = self.used_questions.iter().map(String::as_str).collect();
        used.sort_unstable();
        used
    }
}

/// Shapes a final entry from a curated pair and the record it came from.
pub fn finalize(candidate: CurationCandidate, source: Option<&QuestionRecord>, phase: Phase) -> FinalQuestion {
    let (category, tags) = match source {
        Some(record) => (record.category.clone(), record.tags.clone()),
        None => (phase.category().to_string(), vec!["general".to_string()]),
    };

    FinalQuestion {
        question: candidate.enhanced_question,
        category,
        tags,
        phase: phase.label().to_string(),
    }
}
