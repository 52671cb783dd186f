//! Lifecycle event stream over WebSocket.
//!
//! A client connecting to `/ws/agents` first receives an `agents_sync`
//! snapshot, then every `agent_started` / `agent_stopped` event as it happens.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::AppState;
use crate::agent::{AgentKind, AgentSummary, Coordinator, LifecycleEvent};

/// Messages pushed to WebSocket clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Full registry snapshot (on connect and after lagging).
    AgentsSync { agents: Vec<AgentSummary> },
    AgentStarted { id: String, kind: AgentKind },
    AgentStopped { id: String, kind: AgentKind },
}

impl From<LifecycleEvent> for WsMessage {
    fn from(event: LifecycleEvent) -> Self {
        match event {
            LifecycleEvent::AgentStarted { id, kind } => Self::AgentStarted { id, kind },
            LifecycleEvent::AgentStopped { id, kind } => Self::AgentStopped { id, kind },
        }
    }
}

pub(super) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    info!("Agent event WebSocket client connecting");
    ws.on_upgrade(|socket| handle_socket(socket, state.coordinator))
}

async fn send_json(socket: &mut WebSocket, msg: &WsMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize WS message");
            true
        }
    }
}

async fn send_sync(socket: &mut WebSocket, coordinator: &Coordinator) -> bool {
    let agents = coordinator.list_all().await;
    send_json(socket, &WsMessage::AgentsSync { agents }).await
}

async fn handle_socket(mut socket: WebSocket, coordinator: Arc<Coordinator>) {
    // Subscribe before the snapshot so no event falls between the two.
    let mut rx = coordinator.subscribe();

    if !send_sync(&mut socket, &coordinator).await {
        warn!("Failed to send initial sync, client disconnected");
        return;
    }
    info!("Agent event WebSocket client connected");

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if !send_json(&mut socket, &WsMessage::from(event)).await {
                            debug!("Client disconnected during send");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!(missed = n, "WS client lagged behind lifecycle broadcast");
                        if !send_sync(&mut socket, &coordinator).await {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => {
                        debug!("Lifecycle broadcast closed");
                        break;
                    }
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Agent event WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
}
