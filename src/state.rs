//! Shared application state.
//!
//! Contains the state that is shared across all request handlers,
//! including configuration, the admission resolver, and token storage.

use std::sync::Arc;

use crate::admission::AdmissionResolver;
use crate::config::ConfigV1;
use crate::metrics::Metrics;
use crate::store::TokenStore;

/// Application state shared across all HTTP handlers.
///
/// This state is cloned for each request handler and contains
/// references to the configuration, the admission resolver, and the
/// token store.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// The resolver that admits or rejects every inbound request.
    pub resolver: Arc<AdmissionResolver>,
    /// Token store the resolver reads session and bearer tokens from.
    pub store: Arc<dyn TokenStore>,
    /// Prometheus metrics collector.
    pub metrics: Metrics,
}
