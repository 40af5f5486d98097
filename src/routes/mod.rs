//! HTTP route definitions and handlers.
//!
//! This module organizes the operational endpoints (introspection,
//! health, metrics) and wires the admission middleware in front of all
//! of them.

mod admission_routes;
mod health_routes;
mod metrics_routes;

use axum::{middleware, Router};

use crate::admission::layer::admission_middleware;
use crate::state::AppState;

/// Creates the application router with all configured routes.
///
/// Every route sits behind the admission middleware, so handlers always
/// observe a resolved request context and rejected requests never reach
/// them.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(admission_routes::routes())
        .merge(health_routes::routes())
        .merge(metrics_routes::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admission_middleware,
        ))
        .with_state(state)
}
