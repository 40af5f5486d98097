//! Application startup and server initialization.
//!
//! This module handles the creation and configuration of the HTTP
//! server, including initialization of the token store, the admission
//! resolver, and route setup.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::admission::AdmissionResolver;
use crate::config::ConfigV1;
use crate::metrics::Metrics;
use crate::routes;
use crate::state::AppState;
use crate::store::create_store;

/// Initializes and runs the application server.
///
/// Sets up the token store, the admission resolver, and the HTTP server
/// with configured routes. Binds to the address specified in the
/// configuration and starts serving requests.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let store = create_store(&config.store).await;
    let resolver = Arc::new(AdmissionResolver::new(store.clone()));
    let metrics = Metrics::new();

    info!("Starting server on {}", config.bind_address);

    let state = AppState {
        config: config.clone(),
        resolver,
        store,
        metrics,
    };

    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .expect("Could not bind to specified address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .unwrap();

    Ok(())
}
