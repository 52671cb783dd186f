//! The pluggable unit of work a worker calls through.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::kind::AgentKind;
use super::output::{TaskOutput, TaskRequest};
use super::placeholder::{
    PlaceholderCodeAnalysis, PlaceholderDocumentation, PlaceholderResearch,
    PlaceholderTestGeneration,
};
use crate::error::CapabilityError;

/// Does the actual (domain-specific) work for one agent kind.
///
/// Invocation is the only point where a worker task suspends.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Perform one unit of work.
    async fn invoke(&self, request: &TaskRequest) -> Result<TaskOutput, CapabilityError>;
}

/// Capability lookup by agent kind, consulted when the coordinator builds a worker.
#[derive(Clone)]
pub struct CapabilitySet {
    capabilities: HashMap<AgentKind, Arc<dyn Capability>>,
}

impl CapabilitySet {
    /// Create an empty set.
    pub fn empty() -> Self {
        Self {
            capabilities: HashMap::new(),
        }
    }

    /// Placeholder capabilities for every kind, each sleeping for `latency`.
    pub fn placeholders(latency: Duration) -> Self {
        Self::empty()
            .with(AgentKind::Research, Arc::new(PlaceholderResearch::new(latency)))
            .with(
                AgentKind::CodeAnalysis,
                Arc::new(PlaceholderCodeAnalysis::new(latency)),
            )
            .with(
                AgentKind::Documentation,
                Arc::new(PlaceholderDocumentation::new(latency)),
            )
            .with(
                AgentKind::TestGeneration,
                Arc::new(PlaceholderTestGeneration::new(latency)),
            )
    }

    /// Register (or replace) the capability for `kind`.
    pub fn with(mut self, kind: AgentKind, capability: Arc<dyn Capability>) -> Self {
        tracing::debug!(kind = %kind, capability = capability.name(), "Registered capability");
        self.capabilities.insert(kind, capability);
        self
    }

    pub fn get(&self, kind: AgentKind) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(&kind).cloned()
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::placeholders(Duration::ZERO)
    }
}
