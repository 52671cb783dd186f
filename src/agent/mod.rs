//! Agent system: worker lifecycle and coordination.
//!
//! Core components:
//! - `kind` - the fixed set of agent kinds and their labels
//! - `state` - worker state machine (Idle ⇄ Busy)
//! - `output` - task requests and kind-specific results
//! - `capability` - pluggable work strategy, looked up per kind
//! - `placeholder` - default capabilities returning shaped, empty results
//! - `worker` - generic single-task worker
//! - `coordinator` - registry, start/stop/list, lifecycle broadcast

pub mod capability;
pub mod coordinator;
pub mod kind;
pub mod output;
pub mod placeholder;
pub mod state;
pub mod worker;

pub use capability::{Capability, CapabilitySet};
pub use coordinator::{Coordinator, LifecycleEvent};
pub use kind::AgentKind;
pub use output::{Suggestion, TaskOutput, TaskRequest};
pub use state::{AgentStatus, CurrentTask};
pub use worker::{AgentDetail, AgentSummary, Worker};
