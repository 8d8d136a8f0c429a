// Question bank: corpus records, interview phases, and the similarity index.
// The corpus is loaded once at startup and never mutated afterwards.

pub mod corpus;
pub mod index;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single question from the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QuestionRecord {
    /// Both text fields carry something other than whitespace.
    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty() && !self.category.trim().is_empty()
    }

    /// Text fed to the similarity index for this record.
    pub fn document_text(&self) -> String {
        let mut parts = vec![self.question.as_str(), self.category.as_str()];
        parts.extend(self.tags.iter().map(String::as_str));
        parts.join(" ")
    }
}

/// A stage of the interview. Declaration order is interview order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Introductory,
    Basics,
    ProblemSolving,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Introductory, Phase::Basics, Phase::ProblemSolving];

    /// The corpus category this phase draws from.
    pub fn category(self) -> &'static str {
        match self {
            Phase::Introductory => "introductory",
            Phase::Basics => "basics",
            Phase::ProblemSolving => "problem solving",
        }
    }

    /// Display label: first letter upper-cased, rest lower-cased.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Introductory => "Introductory",
            Phase::Basics => "Basics",
            Phase::ProblemSolving => "Problem solving",
        }
    }

    /// What questions in this phase are for. Sent to the curator so it can tell
    /// phases apart within one shared corpus.
    pub fn definition(self) -> &'static str {
        match self {
            Phase::Introductory => {
                "Questions about the candidate's background, experience, and general fit \
                 (e.g., \"How have you used Airflow in past projects?\" rather than technical \
                 details like \"How do you optimize PostgreSQL queries?\")."
            }
            Phase::Basics => {
                "Questions testing fundamental technical knowledge and skills \
                 (e.g., explaining tools or concepts like SQL or FastAPI)."
            }
            Phase::ProblemSolving => {
                "Questions requiring the candidate to solve hypothetical problems or design \
                 solutions (e.g., system design or optimization)."
            }
        }
    }

    pub fn matches(self, category: &str) -> bool {
        category.trim().eq_ignore_ascii_case(self.category())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}
