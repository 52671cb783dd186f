//! Generic worker: one task at a time, any agent kind.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::capability::Capability;
use super::kind::AgentKind;
use super::output::{Suggestion, TaskOutput, TaskRequest};
use super::state::{AgentStatus, CurrentTask, StatusTransition, WorkerState};
use crate::error::AgentError;

/// Point-in-time view of a worker, as reported by `list_all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub kind: AgentKind,
    pub status: AgentStatus,
    /// `idle`, or the kind's busy label (`researching`, `analyzing`, ...).
    pub label: String,
    pub capabilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task: Option<CurrentTask>,
    pub result_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Summary plus recent status history, as reported for a single agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDetail {
    #[serde(flatten)]
    pub summary: AgentSummary,
    pub transitions: Vec<StatusTransition>,
}

/// A worker bound to one capability.
///
/// Status bookkeeping sits behind a synchronous mutex that is never held
/// across an `.await`, so transitions are atomic with respect to other tasks.
pub struct Worker {
    id: String,
    kind: AgentKind,
    capability: Arc<dyn Capability>,
    created_at: DateTime<Utc>,
    state: Mutex<WorkerState>,
}

impl Worker {
    pub fn new(id: impl Into<String>, kind: AgentKind, capability: Arc<dyn Capability>) -> Self {
        Self {
            id: id.into(),
            kind,
            capability,
            created_at: Utc::now(),
            state: Mutex::new(WorkerState::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, WorkerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn status(&self) -> AgentStatus {
        self.state().status
    }

    pub fn current_task(&self) -> Option<CurrentTask> {
        self.state().current_task.clone()
    }

    /// Results retained so far (research workers only).
    pub fn results(&self) -> Vec<TaskOutput> {
        self.state().results.clone()
    }

    pub fn transitions(&self) -> Vec<StatusTransition> {
        self.state().transitions.clone()
    }

    /// Initialize the worker. Idempotent: always leaves it idle.
    pub fn start(&self) {
        self.state().reset("Worker started");
        tracing::debug!(agent_id = %self.id, kind = %self.kind, "Worker initialized");
    }

    /// Forget any in-flight task and return to idle.
    ///
    /// An in-flight capability call is not interrupted; when it settles its
    /// result is dropped because the task is no longer current.
    pub fn shutdown(&self) {
        let mut state = self.state();
        if let Some(task) = &state.current_task {
            tracing::info!(
                agent_id = %self.id,
                task_id = %task.task_id,
                "Worker shut down with a task in flight, result will be discarded"
            );
        }
        state.reset("Worker stopped");
    }

    pub fn summary(&self) -> AgentSummary {
        self.summarize(&self.state())
    }

    /// Summary and transition history, read under one lock.
    pub fn detail(&self) -> AgentDetail {
        let state = self.state();
        AgentDetail {
            summary: self.summarize(&state),
            transitions: state.transitions.clone(),
        }
    }

    fn summarize(&self, state: &WorkerState) -> AgentSummary {
        let label = if state.status.is_idle() {
            AgentStatus::Idle.to_string()
        } else {
            self.kind.busy_label().to_string()
        };
        AgentSummary {
            id: self.id.clone(),
            kind: self.kind,
            status: state.status,
            label,
            capabilities: self.kind.capabilities().iter().map(|c| c.to_string()).collect(),
            current_task: state.current_task.clone(),
            result_count: state.results.len(),
            created_at: self.created_at,
        }
    }

    /// Run one task through the capability.
    ///
    /// Rejects with [`AgentError::Busy`] when a task is already in flight.
    /// On failure the worker is back to idle before the error is returned.
    pub async fn run(&self, request: TaskRequest) -> Result<TaskOutput, AgentError> {
        let task = CurrentTask::new(request.context.clone());
        let task_id = task.task_id;

        self.state().begin(task).map_err(|_| AgentError::Busy {
            id: self.id.clone(),
            label: self.kind.busy_label().to_string(),
        })?;

        tracing::info!(
            agent_id = %self.id,
            task_id = %task_id,
            capability = self.capability.name(),
            "{}",
            self.kind.busy_label()
        );

        let outcome = self.capability.invoke(&request).await;

        let mut state = self.state();
        match outcome {
            Ok(output) if output.kind() != self.kind => {
                state.finish(task_id, "Task produced mismatched output");
                drop(state);
                tracing::error!(
                    agent_id = %self.id,
                    expected = %self.kind,
                    actual = %output.kind(),
                    "Capability returned output for the wrong kind"
                );
                Err(AgentError::OutputMismatch {
                    id: self.id.clone(),
                    expected: self.kind,
                    actual: output.kind(),
                })
            }
            Ok(output) => {
                if state.finish(task_id, "Task completed") && self.kind.accumulates_results() {
                    state.results.push(output.clone());
                }
                drop(state);
                tracing::info!(agent_id = %self.id, task_id = %task_id, "Task completed");
                Ok(output)
            }
            Err(source) => {
                state.finish(task_id, "Task failed");
                drop(state);
                tracing::warn!(agent_id = %self.id, task_id = %task_id, error = %source, "Task failed");
                Err(AgentError::TaskFailed {
                    id: self.id.clone(),
                    source,
                })
            }
        }
    }

    /// Best-effort suggestions: empty when busy or when the task fails.
    pub async fn suggest(&self, request: TaskRequest) -> Vec<Suggestion> {
        if !self.status().is_idle() {
            tracing::debug!(agent_id = %self.id, "Suggestion request skipped, worker busy");
            return Vec::new();
        }

        match self.run(request).await {
            Ok(output) => output.suggestions(),
            Err(e) => {
                tracing::warn!(agent_id = %self.id, error = %e, "Error providing suggestions");
                Vec::new()
            }
        }
    }

    /// Regenerate documentation, falling back to `existing` when busy or on failure.
    pub async fn update_documentation(&self, existing: &str, request: TaskRequest) -> String {
        if !self.status().is_idle() {
            return existing.to_string();
        }

        match self.run(request).await {
            Ok(output @ TaskOutput::Documentation(_)) => serde_json::to_string_pretty(&output)
                .unwrap_or_else(|e| {
                    tracing::warn!(agent_id = %self.id, error = %e, "Failed to render documentation");
                    existing.to_string()
                }),
            Ok(_) => existing.to_string(),
            Err(e) => {
                tracing::warn!(agent_id = %self.id, error = %e, "Error updating documentation");
                existing.to_string()
            }
        }
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("capability", &self.capability.name())
            .field("status", &self.status())
            .finish()
    }
}
