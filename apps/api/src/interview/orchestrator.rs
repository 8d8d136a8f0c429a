//! Interview Orchestrator: runs every phase in order for one request.
//!
//! Phases run sequentially: each one reads and extends the used-question set
//! left by the phases before it, so no question appears twice in a response.
//! Any phase that cannot deliver a full set aborts the whole request.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::errors::AppError;
use crate::interview::curator::QuestionCurator;
use crate::interview::models::{FinalQuestion, InterviewContext, InterviewRequest, QUESTIONS_PER_PHASE};
use crate::interview::selector::{PhaseSelector, SelectionSettings};
use crate::questions::index::QuestionIndex;
use crate::questions::Phase;

pub struct InterviewOrchestrator {
    index: Arc<dyn QuestionIndex>,
    curator: Arc<dyn QuestionCurator>,
    settings: SelectionSettings,
    /// Fixed seed for reproducible sampling; `None` seeds each request from entropy.
    seed: Option<u64>,
    preflight: bool,
}

impl InterviewOrchestrator {
    pub fn new(
        index: Arc<dyn QuestionIndex>,
        curator: Arc<dyn QuestionCurator>,
        settings: SelectionSettings,
    ) -> Self {
        Self {
            index,
            curator,
            settings,
            seed: None,
            preflight: true,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_preflight(mut self, preflight: bool) -> Self {
        self.preflight = preflight;
        self
    }

    pub fn question_count(&self) -> usize {
        self.index.len()
    }

    /// Produces `QUESTIONS_PER_PHASE` questions for every phase, in phase order.
    pub async fn conduct(&self, request: &InterviewRequest) -> Result<Vec<FinalQuestion>, AppError> {
        if self.preflight {
            self.curator
                .ensure_available()
                .await
                .map_err(|e| AppError::Llm(format!("Curator model is not available: {e}")))?;
        }

        let mut ctx = InterviewContext::default();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let selector = PhaseSelector::new(self.index.as_ref(), self.curator.as_ref(), &self.settings);

        let mut questions = Vec::with_capacity(Phase::ALL.len() * QUESTIONS_PER_PHASE);
        for phase in Phase::ALL {
            let picked = selector.select(request, phase, &mut ctx, &mut rng).await?;
            if picked.len() < QUESTIONS_PER_PHASE {
                return Err(AppError::QuestionsUnavailable(format!(
                    "Only {} unused questions available for {phase} phase, {QUESTIONS_PER_PHASE} required",
                    picked.len()
                )));
            }
            info!("Selected {} questions for {phase} phase", picked.len());
            questions.extend(picked);
        }

        info!(
            "Final questions generated: {} ({} distinct originals)",
            questions.len(),
            ctx.used_count()
        );
        Ok(questions)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
