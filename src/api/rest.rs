//! REST endpoints for the agent control surface.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::AppState;
use crate::agent::{AgentKind, TaskRequest};
use crate::error::AgentError;

fn error_response(err: &AgentError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        AgentError::UnknownKind { .. } => StatusCode::BAD_REQUEST,
        AgentError::NotFound { .. } => StatusCode::NOT_FOUND,
        AgentError::Busy { .. } => StatusCode::CONFLICT,
        AgentError::TaskFailed { .. } | AgentError::OutputMismatch { .. } => {
            StatusCode::BAD_GATEWAY
        }
        AgentError::NoCapability { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(serde_json::json!({"error": err.to_string()})))
}

// ── Health ──────────────────────────────────────────────────────────────

pub(super) async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "agent-hub"
    }))
}

// ── Kinds ───────────────────────────────────────────────────────────────

pub(super) async fn list_kinds() -> impl IntoResponse {
    let kinds: Vec<_> = AgentKind::ALL
        .iter()
        .map(|kind| {
            serde_json::json!({
                "kind": kind,
                "busy_label": kind.busy_label(),
                "capabilities": kind.capabilities(),
            })
        })
        .collect();
    Json(serde_json::json!({ "kinds": kinds }))
}

// ── Agents ──────────────────────────────────────────────────────────────

pub(super) async fn list_agents(State(state): State<AppState>) -> impl IntoResponse {
    let agents = state.coordinator.list_all().await;
    Json(serde_json::json!({ "agents": agents }))
}

#[derive(Deserialize)]
pub(super) struct StartRequest {
    kind: String,
}

pub(super) async fn start_agent(
    State(state): State<AppState>,
    Json(body): Json<StartRequest>,
) -> impl IntoResponse {
    match state.coordinator.start(&body.kind).await {
        Ok(id) => {
            info!(agent_id = %id, "Agent started via REST");
            (StatusCode::CREATED, Json(serde_json::json!({ "id": id })))
        }
        Err(e) => {
            warn!(kind = %body.kind, error = %e, "Start failed");
            error_response(&e)
        }
    }
}

pub(super) async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.coordinator.require(&id).await {
        Ok(worker) => (StatusCode::OK, Json(serde_json::json!(worker.detail()))),
        Err(e) => error_response(&e),
    }
}

pub(super) async fn stop_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.coordinator.stop(&id).await;
    StatusCode::NO_CONTENT
}

pub(super) async fn stop_all(State(state): State<AppState>) -> impl IntoResponse {
    state.coordinator.stop_all().await;
    StatusCode::NO_CONTENT
}

// ── Tasks ───────────────────────────────────────────────────────────────

pub(super) async fn run_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TaskRequest>,
) -> impl IntoResponse {
    let worker = match state.coordinator.require(&id).await {
        Ok(worker) => worker,
        Err(e) => return error_response(&e),
    };

    match worker.run(request).await {
        Ok(output) => (StatusCode::OK, Json(serde_json::json!(output))),
        Err(e) => error_response(&e),
    }
}

pub(super) async fn suggest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TaskRequest>,
) -> impl IntoResponse {
    let worker = match state.coordinator.require(&id).await {
        Ok(worker) => worker,
        Err(e) => return error_response(&e),
    };

    let suggestions = worker.suggest(request).await;
    (
        StatusCode::OK,
        Json(serde_json::json!({ "suggestions": suggestions })),
    )
}
