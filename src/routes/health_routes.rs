//! Health check endpoints.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Router};

use crate::state::AppState;

/// Registers health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Simple health check endpoint.
///
/// Returns a 200 OK status to indicate the service is running.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
