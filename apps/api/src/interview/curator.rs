//! Question Curator: pluggable, trait-based generative step that narrows a
//! working set down to the final picks for a phase.
//!
//! Default: `LlmCurator`, backed by the shared `LlmClient`.
//! The orchestrator holds an `Arc<dyn QuestionCurator>` so tests can swap in
//! scripted curators.

use async_trait::async_trait;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};

#[async_trait]
pub trait QuestionCurator: Send + Sync {
    /// Sends `prompt` to the model and returns its raw text answer.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Confirms the backing model can be reached before any phase runs.
    async fn ensure_available(&self) -> Result<(), LlmError> {
        Ok(())
    }
}

/// Curator backed by Claude.
pub struct LlmCurator(pub LlmClient);

#[async_trait]
impl QuestionCurator for LlmCurator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.0.call_text(prompt, JSON_ONLY_SYSTEM).await
    }

    async fn ensure_available(&self) -> Result<(), LlmError> {
        self.0.check_model().await
    }
}
