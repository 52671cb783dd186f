//! Worker state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::output::TaskOutput;

/// Lifecycle status of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// No task in flight.
    Idle,
    /// Exactly one task in flight.
    Busy,
}

impl AgentStatus {
    /// Check if this status allows transitioning to another status.
    pub fn can_transition_to(&self, target: AgentStatus) -> bool {
        use AgentStatus::*;

        matches!((self, target), (Idle, Busy) | (Busy, Idle))
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Busy => "busy",
        };
        write!(f, "{s}")
    }
}

/// A status transition event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: AgentStatus,
    pub to: AgentStatus,
    pub timestamp: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Descriptor of the task a busy worker is running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTask {
    pub task_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Caller-supplied context, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl CurrentTask {
    pub fn new(context: Option<serde_json::Value>) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            started_at: Utc::now(),
            context,
        }
    }
}

/// Mutable bookkeeping owned by a single worker.
///
/// Every method is synchronous: callers hold the worker's lock for the whole
/// call, so a half-applied transition is never observable.
#[derive(Debug, Clone)]
pub struct WorkerState {
    pub status: AgentStatus,
    pub current_task: Option<CurrentTask>,
    pub results: Vec<TaskOutput>,
    pub transitions: Vec<StatusTransition>,
}

/// Cap on the retained transition history per worker.
const MAX_TRANSITIONS: usize = 100;

impl WorkerState {
    pub fn new() -> Self {
        Self {
            status: AgentStatus::Idle,
            current_task: None,
            results: Vec::new(),
            transitions: Vec::new(),
        }
    }

    fn transition_to(&mut self, target: AgentStatus, reason: Option<String>) -> Result<(), String> {
        if !self.status.can_transition_to(target) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status, target
            ));
        }

        self.transitions.push(StatusTransition {
            from: self.status,
            to: target,
            timestamp: Utc::now(),
            reason,
        });
        if self.transitions.len() > MAX_TRANSITIONS {
            let drain_count = self.transitions.len() - MAX_TRANSITIONS;
            self.transitions.drain(..drain_count);
        }

        self.status = target;
        Ok(())
    }

    /// Claim the worker for a new task. Fails when a task is already in flight.
    pub fn begin(&mut self, task: CurrentTask) -> Result<(), String> {
        self.transition_to(AgentStatus::Busy, Some("Task started".to_string()))?;
        self.current_task = Some(task);
        Ok(())
    }

    /// Release the worker after the task `task_id` settled.
    ///
    /// Returns `false` when the task is no longer the current one (the worker
    /// was shut down while the capability call was in flight); the state is
    /// left untouched in that case.
    pub fn finish(&mut self, task_id: Uuid, reason: impl Into<String>) -> bool {
        let owns_task = self
            .current_task
            .as_ref()
            .is_some_and(|task| task.task_id == task_id);
        if !owns_task {
            return false;
        }
        self.current_task = None;
        self.transition_to(AgentStatus::Idle, Some(reason.into())).is_ok()
    }

    /// Drop any in-flight task reference and force the status back to idle.
    pub fn reset(&mut self, reason: impl Into<String>) {
        self.current_task = None;
        if self.status != AgentStatus::Idle {
            let _ = self.transition_to(AgentStatus::Idle, Some(reason.into()));
        }
    }
}

impl Default for WorkerState {
    fn default() -> Self {
        Self::new()
    }
}
