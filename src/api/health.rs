//! Health check endpoint

use axum::{Router, routing::any};

const HEALTHY: &str = "Bot is healthy!";

/// Liveness probe, answers every method
async fn health() -> &'static str {
    HEALTHY
}

pub fn router() -> Router {
    Router::new().route("/health", any(health))
}
