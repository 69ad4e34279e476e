//! HTTP query API for the bulletin service.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::AppState;

/// The router with every middleware layer applied.
pub fn build_app(state: Arc<AppState>) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http().make_span_with(middleware::make_request_span))
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(middleware::cors_layer())
}

/// Serve the API until ctrl-c.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "API listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
