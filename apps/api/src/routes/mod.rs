pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/conduct_interview/",
            post(handlers::handle_conduct_interview),
        )
        .route("/feedback/", post(handlers::handle_feedback))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
