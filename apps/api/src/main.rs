mod config;
mod errors;
mod interview;
mod llm_client;
mod questions;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::interview::curator::LlmCurator;
use crate::interview::orchestrator::InterviewOrchestrator;
use crate::interview::selector::SelectionSettings;
use crate::llm_client::LlmClient;
use crate::questions::corpus::load_question_bank;
use crate::questions::index::{LexicalIndex, QuestionIndex};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Build the question index once; the service is not ready without it
    let records = load_question_bank(&config.question_bank_path)
        .context("Failed to load the interview question bank")?;
    let index: Arc<dyn QuestionIndex> = Arc::new(LexicalIndex::build(records));
    info!("Question index built with {} questions", index.len());

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.curator_timeout)
        .context("Failed to build LLM HTTP client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let settings = SelectionSettings {
        candidate_pool_size: config.candidate_pool_size,
        working_set_size: config.working_set_size,
        curator_timeout: config.curator_timeout,
    };
    let orchestrator = InterviewOrchestrator::new(index, Arc::new(LlmCurator(llm.clone())), settings)
        .with_seed(config.selection_seed)
        .with_preflight(config.curator_preflight);

    // Build app state
    let state = AppState {
        config: config.clone(),
        orchestrator: Arc::new(orchestrator),
        llm,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
