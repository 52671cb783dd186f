//! HTTP + WebSocket transport for the coordinator.

pub mod rest;
pub mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::agent::Coordinator;
use crate::error::{Result, TransportError};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

/// Build the Axum router with agent REST routes and the event WebSocket.
pub fn agent_routes(coordinator: Arc<Coordinator>) -> Router {
    let state = AppState { coordinator };

    Router::new()
        .route("/health", get(rest::health))
        .route("/ws/agents", get(ws::ws_handler))
        .route("/api/agent-kinds", get(rest::list_kinds))
        .route("/api/agents", get(rest::list_agents).post(rest::start_agent))
        .route("/api/agents/stop-all", post(rest::stop_all))
        .route(
            "/api/agents/{id}",
            get(rest::get_agent).delete(rest::stop_agent),
        )
        .route("/api/agents/{id}/run", post(rest::run_agent))
        .route("/api/agents/{id}/suggest", post(rest::suggest))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the transport listener on `addr`.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| TransportError::Bind { addr, source })?;
    Ok(listener)
}

/// Serve the agent routes on `listener`. Only returns when the server fails.
pub async fn serve(listener: TcpListener, coordinator: Arc<Coordinator>) -> Result<()> {
    let addr = listener.local_addr().map_err(TransportError::Serve)?;
    tracing::info!(%addr, "Agent transport started");
    axum::serve(listener, agent_routes(coordinator))
        .await
        .map_err(TransportError::Serve)?;
    Ok(())
}
