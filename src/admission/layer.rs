//! HTTP integration for the admission resolver.
//!
//! The middleware gathers cookies, query parameters, and Authorization
//! headers from the raw request, runs the resolver, and attaches the
//! resulting `ResolvedContext` to the request extensions. Handlers
//! retrieve it through the `FromRequestParts` extractor below.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::request::Parts;
use tracing::warn;

use super::context::ResolvedContext;
use super::resolver::{AdmissionError, AUTHORIZATION_HEADER};
use crate::metrics::MetricsRecorder;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;
use crate::utils::log_throttle::Throttle;

// Repeated rejection warnings share one suppression window so a
// misbehaving client cannot flood the logs.
fn rejection_throttle() -> &'static Throttle {
    static THROTTLE: OnceLock<Throttle> = OnceLock::new();
    THROTTLE.get_or_init(|| Throttle::new(Duration::from_secs(10)))
}

/// Runs credential resolution before any handler and attaches the result
/// to the request.
///
/// Rejections short-circuit the request: conflicting or unknown
/// credentials map to 401, store faults to 500. No business handler runs
/// for a rejected request.
pub async fn admission_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookies = collect_cookies(request.headers());
    let parameters = collect_parameters(request.uri().query());
    let headers = collect_authorization_headers(request.headers());

    let started = Instant::now();
    match state.resolver.resolve(&cookies, &parameters, &headers).await {
        Ok(context) => {
            state
                .metrics
                .record_admission("admitted", started.elapsed().as_secs_f64());
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(error) => {
            let result = match &error {
                AdmissionError::ConflictingCredentials(_) => "conflict",
                AdmissionError::UnknownOrInvalidCredential(_) => "rejected",
                AdmissionError::Store(_) => "fault",
            };
            state
                .metrics
                .record_admission(result, started.elapsed().as_secs_f64());

            let client_ip = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            if let Some(suppressed) = rejection_throttle().emit(result) {
                warn!(
                    client_ip = %client_ip,
                    suppressed,
                    "admission refused: {}",
                    error
                );
            }

            admission_error_response(&error)
        }
    }
}

/// Maps an admission failure onto the HTTP boundary.
fn admission_error_response(error: &AdmissionError) -> Response {
    let status = match error {
        AdmissionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNAUTHORIZED,
    };
    HTTPError::new(status, error.to_string()).into_response()
}

/// Splits every `Cookie` header into (name, value) pairs.
fn collect_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    let mut cookies = Vec::new();
    for header in headers.get_all(COOKIE) {
        let Ok(header) = header.to_str() else {
            continue;
        };
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            cookies.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    cookies
}

/// Decodes the query string into name -> values, preserving repeated
/// names. An unparseable query string yields no parameters rather than a
/// rejection; admission only cares about the `auth_token` key.
fn collect_parameters(query: Option<&str>) -> HashMap<String, Vec<String>> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(query.unwrap_or("")).unwrap_or_default();

    let mut parameters: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in pairs {
        parameters.entry(name).or_default().push(value);
    }
    parameters
}

/// The raw Authorization header values, in request order.
fn collect_authorization_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(AUTHORIZATION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(|value| (AUTHORIZATION_HEADER.to_string(), value.to_string()))
        .collect()
}

/// Extractor implementation: retrieves the context the middleware
/// attached to this request.
///
/// A missing extension means the admission stage never ran, which is a
/// wiring error and deliberately distinct from an admitted-but-anonymous
/// request (where the context is present with both principals absent).
impl FromRequestParts<AppState> for ResolvedContext {
    type Rejection = HTTPError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<ResolvedContext, HTTPError> {
        parts.extensions.get::<ResolvedContext>().cloned().ok_or_else(|| {
            HTTPError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "request did not pass through the admission stage",
            )
        })
    }
}
