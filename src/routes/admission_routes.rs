//! Resolved-context introspection endpoints.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::admission::ResolvedContext;
use crate::state::AppState;

/// Registers introspection routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/whoami", get(whoami))
}

#[derive(Serialize)]
struct WhoamiResponse {
    username: Option<String>,
    token_is_from_parameter: bool,
    third_party_client: Option<String>,
}

/// Reports the principals resolved for this request.
///
/// Anonymous requests are admitted, so both principals may be absent.
async fn whoami(context: ResolvedContext) -> Json<WhoamiResponse> {
    Json(WhoamiResponse {
        username: context
            .authentication
            .as_ref()
            .map(|token| token.username.clone()),
        token_is_from_parameter: context.token_is_from_parameter,
        third_party_client: context
            .authorization
            .as_ref()
            .map(|token| token.client_id.clone()),
    })
}
