use std::sync::Arc;

use crate::config::Config;
use crate::interview::orchestrator::InterviewOrchestrator;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Interview pipeline over the question bank loaded at startup. Read-only.
    pub orchestrator: Arc<InterviewOrchestrator>,
    pub llm: LlmClient,
}
