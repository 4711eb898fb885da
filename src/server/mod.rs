//! HTTP surface of the update server
//!
//! # Modules
//!
//! - [`error`]: Maps update errors to status codes and plain-text bodies
//! - [`handlers`]: Route handlers
//! - [`state`]: Shared state built from configuration

pub mod error;
pub mod handlers;
pub mod state;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::server::state::AppState;

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route(
            "/{owner}/{repo}/{platform}/{version}",
            get(handlers::check_update),
        )
        .route(
            "/{owner}/{repo}/{platform}/{version}/RELEASES",
            get(handlers::releases_manifest),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server until `shutdown` resolves.
pub async fn run_server<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if config.upstream.token.is_none() {
        info!("No upstream token configured, requests are subject to anonymous rate limits");
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let app = create_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}
