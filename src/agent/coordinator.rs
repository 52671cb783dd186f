//! Agent coordinator: registry, control surface and lifecycle broadcast.
//!
//! The coordinator is the only owner of the worker registry. Observers
//! subscribe to [`LifecycleEvent`]s and unregister by dropping their receiver.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info};

use super::capability::CapabilitySet;
use super::kind::AgentKind;
use super::worker::{AgentSummary, Worker};
use crate::config::DEFAULT_EVENT_CAPACITY;
use crate::error::AgentError;

/// Notification emitted at a start/stop boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    AgentStarted { id: String, kind: AgentKind },
    AgentStopped { id: String, kind: AgentKind },
}

impl LifecycleEvent {
    pub fn id(&self) -> &str {
        match self {
            Self::AgentStarted { id, .. } | Self::AgentStopped { id, .. } => id,
        }
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Self::AgentStarted { kind, .. } | Self::AgentStopped { kind, .. } => *kind,
        }
    }
}

/// Starts, tracks and stops workers.
pub struct Coordinator {
    capabilities: CapabilitySet,
    workers: RwLock<HashMap<String, Arc<Worker>>>,
    events: broadcast::Sender<LifecycleEvent>,
    /// Last timestamp component handed out in an identifier.
    last_stamp: AtomicI64,
}

impl Coordinator {
    /// Create a coordinator with the given capabilities and event buffer size.
    pub fn new(capabilities: CapabilitySet, event_capacity: usize) -> Arc<Self> {
        let (events, _rx) = broadcast::channel(event_capacity.max(1));
        Arc::new(Self {
            capabilities,
            workers: RwLock::new(HashMap::new()),
            events,
            last_stamp: AtomicI64::new(0),
        })
    }

    /// Coordinator backed by the placeholder capabilities.
    pub fn with_defaults() -> Arc<Self> {
        Self::new(CapabilitySet::default(), DEFAULT_EVENT_CAPACITY)
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Millisecond timestamp, strictly greater than any previously issued one.
    fn next_stamp(&self) -> i64 {
        loop {
            let last = self.last_stamp.load(Ordering::Acquire);
            let next = Utc::now().timestamp_millis().max(last + 1);
            match self.last_stamp.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(_) => continue,
            }
        }
    }

    /// Start a worker of the given kind and return its identifier.
    pub async fn start(&self, kind: &str) -> Result<String, AgentError> {
        let kind: AgentKind = kind.parse()?;
        let capability = self
            .capabilities
            .get(kind)
            .ok_or(AgentError::NoCapability { kind })?;

        let id = format!("{}-{}", kind.slug(), self.next_stamp());
        let worker = Arc::new(Worker::new(id.clone(), kind, capability));

        {
            // Publish under the lock so a racing stop cannot announce first.
            let mut workers = self.workers.write().await;
            workers.insert(id.clone(), Arc::clone(&worker));
            worker.start();
            let _ = self.events.send(LifecycleEvent::AgentStarted {
                id: id.clone(),
                kind,
            });
        }

        info!(agent_id = %id, kind = %kind, "Agent started");
        Ok(id)
    }

    /// Stop a worker. Unknown identifiers are ignored.
    pub async fn stop(&self, id: &str) {
        let removed = {
            let mut workers = self.workers.write().await;
            let worker = workers.remove(id);
            if let Some(worker) = &worker {
                worker.shutdown();
                let _ = self.events.send(LifecycleEvent::AgentStopped {
                    id: id.to_string(),
                    kind: worker.kind(),
                });
            }
            worker
        };

        match removed {
            Some(worker) => info!(agent_id = %id, kind = %worker.kind(), "Agent stopped"),
            None => debug!(agent_id = %id, "Stop requested for unknown agent"),
        }
    }

    /// Stop every registered worker.
    ///
    /// Stops run concurrently; no ordering between workers is implied.
    pub async fn stop_all(&self) {
        let ids: Vec<String> = self.workers.read().await.keys().cloned().collect();
        if ids.is_empty() {
            return;
        }

        info!(count = ids.len(), "Stopping all agents");
        join_all(ids.iter().map(|id| self.stop(id))).await;
    }

    /// Look up a worker by identifier.
    pub async fn get(&self, id: &str) -> Option<Arc<Worker>> {
        self.workers.read().await.get(id).cloned()
    }

    /// Look up a worker, failing with [`AgentError::NotFound`].
    pub async fn require(&self, id: &str) -> Result<Arc<Worker>, AgentError> {
        self.get(id).await.ok_or_else(|| AgentError::NotFound { id: id.to_string() })
    }

    /// Snapshot of every registered worker, oldest first.
    pub async fn list_all(&self) -> Vec<AgentSummary> {
        let mut summaries: Vec<AgentSummary> = self
            .workers
            .read()
            .await
            .values()
            .map(|worker| worker.summary())
            .collect();
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    /// Number of registered workers.
    pub async fn len(&self) -> usize {
        self.workers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.workers.read().await.is_empty()
    }
}
