use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use admitron::admission::AdmissionResolver;
use admitron::config::{Config, ConfigV1};
use admitron::metrics::Metrics;
use admitron::routes::create_router;
use admitron::state::AppState;
use admitron::store::create_store;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};

// A memory-backed store seeded with one valid, one expired, and one
// revoked session token, plus one valid and one expired bearer token.
pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
logging:
  level: "debug"
  format: "json"
store:
  type: "memory"
  authentication_tokens:
    - access_token: "valid-session"
      username: "adam"
      granted: 1700000000
      expires: 4102444800
    - access_token: "expired-session"
      username: "eve"
      granted: 1500000000
      expires: 1500003600
    - access_token: "revoked-session"
      username: "mallory"
      granted: 1700000000
      expires: 4102444800
      invalidated: true
  authorization_tokens:
    - access_token: "valid-bearer"
      client_id: "research-dashboard"
      username: "adam"
      granted: 1700000000
      expires: 4102444800
    - access_token: "expired-bearer"
      client_id: "research-dashboard"
      username: "eve"
      granted: 1500000000
      expires: 1500003600
bind_address: 127.0.0.1:8081
"#;

pub fn load_test_config() -> ConfigV1 {
    let config: Config = Figment::new()
        .merge(Yaml::string(TEST_CONFIG))
        .extract()
        .expect("Failed to parse test config YAML");

    match config {
        Config::ConfigV1(cfg) => cfg,
    }
}

pub async fn build_state(config: ConfigV1) -> AppState {
    let config = Arc::new(config);
    let store = create_store(&config.store).await;
    let resolver = Arc::new(AdmissionResolver::new(store.clone()));
    let metrics = Metrics::new();

    AppState {
        config,
        resolver,
        store,
        metrics,
    }
}

pub async fn build_app(config: ConfigV1) -> (Router, Arc<ConfigV1>) {
    let state = build_state(config).await;
    let config = state.config.clone();
    (create_router(state), config)
}

/// Builds a GET request carrying the given raw headers.
pub fn get_request(path: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let mut request = builder.body(Body::empty()).expect("failed to build request");

    request.extensions_mut().insert(ConnectInfo(SocketAddr::new(
        IpAddr::V4(Ipv4Addr::LOCALHOST),
        0,
    )));

    request
}
