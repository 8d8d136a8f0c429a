// Interview Question Engine
// Implements: per-phase retrieval, curator reconciliation with a random-sampling
// fallback, cross-phase deduplication, and answer feedback.
// All LLM calls go through llm_client; no direct Anthropic calls here.

pub mod curation;
pub mod curator;
pub mod feedback;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod selector;
