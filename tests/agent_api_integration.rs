//! Integration tests for the agent REST + WebSocket transport.
//!
//! Each test spins up an Axum server on a random port, connects via
//! tokio-tungstenite / reqwest, and exercises the real wire contract.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::Notify;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use agent_hub::agent::output::{CodeAnalysis, SuggestionBuckets};
use agent_hub::agent::{
    AgentKind, AgentStatus, Capability, CapabilitySet, Coordinator, TaskOutput, TaskRequest,
};
use agent_hub::api;
use agent_hub::error::{CapabilityError, Error, TransportError};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Code analysis capability that waits for `release` before answering.
struct GatedAnalysis {
    release: Arc<Notify>,
}

#[async_trait]
impl Capability for GatedAnalysis {
    fn name(&self) -> &str {
        "gated-analysis"
    }
    async fn invoke(&self, _request: &TaskRequest) -> Result<TaskOutput, CapabilityError> {
        self.release.notified().await;
        Ok(TaskOutput::CodeAnalysis(CodeAnalysis {
            suggestions: SuggestionBuckets {
                improvements: vec!["Use iterators".into()],
                ..Default::default()
            },
            ..Default::default()
        }))
    }
}

/// Research capability that always fails.
struct BrokenResearch;

#[async_trait]
impl Capability for BrokenResearch {
    fn name(&self) -> &str {
        "broken-research"
    }
    async fn invoke(&self, _request: &TaskRequest) -> Result<TaskOutput, CapabilityError> {
        Err(CapabilityError::Failed {
            capability: "broken-research".into(),
            reason: "index offline".into(),
        })
    }
}

/// Start an Axum server on a random port, return (port, coordinator).
async fn start_server_with(capabilities: CapabilitySet) -> (u16, Arc<Coordinator>) {
    let coordinator = Coordinator::new(capabilities, 64);

    let listener = api::bind(([127, 0, 0, 1], 0).into()).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(api::serve(listener, Arc::clone(&coordinator)));

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (port, coordinator)
}

async fn start_server() -> (u16, Arc<Coordinator>) {
    start_server_with(CapabilitySet::default()).await
}

/// Parse a WS text frame into a serde_json::Value.
fn parse_ws_json(msg: &Message) -> Value {
    match msg {
        Message::Text(txt) => serde_json::from_str(txt).expect("invalid JSON from server"),
        other => panic!("expected Text frame, got {:?}", other),
    }
}

async fn post_start(client: &reqwest::Client, port: u16, kind: &str) -> reqwest::Response {
    client
        .post(format!("http://127.0.0.1:{port}/api/agents"))
        .json(&serde_json::json!({ "kind": kind }))
        .send()
        .await
        .unwrap()
}

// ── REST Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn rest_health_endpoint() {
    timeout(TEST_TIMEOUT, async {
        let (port, _coordinator) = start_server().await;

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/health"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_start_then_list_three_kinds() {
    timeout(TEST_TIMEOUT, async {
        let (port, _coordinator) = start_server().await;
        let client = reqwest::Client::new();

        let mut ids = HashSet::new();
        for kind in ["Research Agent", "Code Analysis Agent", "Documentation Agent"] {
            let resp = post_start(&client, port, kind).await;
            assert_eq!(resp.status(), 201);
            let body: Value = resp.json().await.unwrap();
            ids.insert(body["id"].as_str().unwrap().to_string());
        }
        assert_eq!(ids.len(), 3);

        let body: Value = reqwest::get(format!("http://127.0.0.1:{port}/api/agents"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let agents = body["agents"].as_array().unwrap();
        assert_eq!(agents.len(), 3);

        let listed: HashSet<String> = agents
            .iter()
            .map(|a| a["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(listed, ids);

        let kinds: HashSet<&str> = agents.iter().map(|a| a["kind"].as_str().unwrap()).collect();
        assert!(kinds.contains("Code Analysis Agent"));
        assert!(agents.iter().all(|a| a["status"] == "idle"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_unknown_kind_returns_400() {
    timeout(TEST_TIMEOUT, async {
        let (port, coordinator) = start_server().await;
        let client = reqwest::Client::new();

        let resp = post_start(&client, port, "Unknown Kind").await;
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("Unknown Kind"));
        assert!(coordinator.is_empty().await);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_get_and_stop_agent() {
    timeout(TEST_TIMEOUT, async {
        let (port, coordinator) = start_server().await;
        let id = coordinator.start("Test Generation Agent").await.unwrap();
        let client = reqwest::Client::new();

        let resp = client
            .get(format!("http://127.0.0.1:{port}/api/agents/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["kind"], "Test Generation Agent");
        assert_eq!(body["capabilities"][0], "test-generation");

        for _ in 0..2 {
            let resp = client
                .delete(format!("http://127.0.0.1:{port}/api/agents/{id}"))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), 204);
        }

        let resp = client
            .get(format!("http://127.0.0.1:{port}/api/agents/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_agent_detail_includes_transitions() {
    timeout(TEST_TIMEOUT, async {
        let (port, coordinator) = start_server().await;
        let id = coordinator.start("Documentation Agent").await.unwrap();
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/agents/{id}/run"))
            .json(&serde_json::json!({"text": "fn documented() {}"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = client
            .get(format!("http://127.0.0.1:{port}/api/agents/{id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["id"], id);
        assert_eq!(body["status"], "idle");
        let transitions = body["transitions"].as_array().unwrap();
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0]["from"], "idle");
        assert_eq!(transitions[0]["to"], "busy");
        assert_eq!(transitions[1]["to"], "idle");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn bind_conflict_reports_address() {
    let taken = api::bind(([127, 0, 0, 1], 0).into()).await.unwrap();
    let addr = taken.local_addr().unwrap();

    let err = api::bind(addr).await.unwrap_err();
    match err {
        Error::Transport(TransportError::Bind { addr: reported, .. }) => assert_eq!(reported, addr),
        other => panic!("expected bind error, got {other:?}"),
    }
}

#[tokio::test]
async fn rest_run_returns_output() {
    timeout(TEST_TIMEOUT, async {
        let (port, coordinator) = start_server().await;
        let id = coordinator.start("Code Analysis Agent").await.unwrap();
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/agents/{id}/run"))
            .json(&serde_json::json!({"text": "fn a() {}\nfn b() {}", "context": {"uri": "file:///a.rs"}}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["type"], "code_analysis");
        assert_eq!(body["complexity"]["lines_of_code"], 2);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_failed_task_returns_502_and_agent_idle() {
    timeout(TEST_TIMEOUT, async {
        let capabilities =
            CapabilitySet::default().with(AgentKind::Research, Arc::new(BrokenResearch));
        let (port, coordinator) = start_server_with(capabilities).await;
        let id = coordinator.start("Research Agent").await.unwrap();

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/agents/{id}/run"))
            .json(&serde_json::json!({"text": "anything"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 502);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("index offline"));

        let worker = coordinator.get(&id).await.unwrap();
        assert_eq!(worker.status(), AgentStatus::Idle);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_busy_agent_conflicts_and_soft_rejects() {
    timeout(TEST_TIMEOUT, async {
        let release = Arc::new(Notify::new());
        let capabilities = CapabilitySet::default().with(
            AgentKind::CodeAnalysis,
            Arc::new(GatedAnalysis {
                release: Arc::clone(&release),
            }),
        );
        let (port, coordinator) = start_server_with(capabilities).await;
        let id = coordinator.start("Code Analysis Agent").await.unwrap();
        let worker = coordinator.get(&id).await.unwrap();

        let first = tokio::spawn({
            let worker = Arc::clone(&worker);
            async move { worker.run(TaskRequest::new("fn a() {}")).await }
        });
        while worker.status() != AgentStatus::Busy {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/agents/{id}/run"))
            .json(&serde_json::json!({"text": "again"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 409);

        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/agents/{id}/suggest"))
            .json(&serde_json::json!({"text": "again"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert!(body["suggestions"].as_array().unwrap().is_empty());

        let listed: Value = reqwest::get(format!("http://127.0.0.1:{port}/api/agents"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed["agents"][0]["status"], "busy");
        assert_eq!(listed["agents"][0]["label"], "analyzing");

        release.notify_one();
        first.await.unwrap().unwrap();
        assert_eq!(worker.status(), AgentStatus::Idle);

        release.notify_one();
        let resp = client
            .post(format!("http://127.0.0.1:{port}/api/agents/{id}/suggest"))
            .json(&serde_json::json!({"text": "now idle"}))
            .send()
            .await
            .unwrap();
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["suggestions"][0]["label"], "Use iterators");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_stop_all_empties_registry() {
    timeout(TEST_TIMEOUT, async {
        let (port, coordinator) = start_server().await;
        for kind in AgentKind::ALL {
            coordinator.start(kind.token()).await.unwrap();
        }

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/agents/stop-all"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);
        assert!(coordinator.is_empty().await);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rest_lists_supported_kinds() {
    timeout(TEST_TIMEOUT, async {
        let (port, _coordinator) = start_server().await;
        let body: Value = reqwest::get(format!("http://127.0.0.1:{port}/api/agent-kinds"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let kinds: Vec<&str> = body["kinds"]
            .as_array()
            .unwrap()
            .iter()
            .map(|k| k["kind"].as_str().unwrap())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "Research Agent",
                "Code Analysis Agent",
                "Documentation Agent",
                "Test Generation Agent"
            ]
        );
    })
    .await
    .expect("test timed out");
}

// ── WebSocket Tests ──────────────────────────────────────────────────

#[tokio::test]
async fn ws_connect_receives_sync_snapshot() {
    timeout(TEST_TIMEOUT, async {
        let (port, coordinator) = start_server().await;
        let id = coordinator.start("Research Agent").await.unwrap();

        let (mut ws, _resp) = connect_async(format!("ws://127.0.0.1:{port}/ws/agents"))
            .await
            .expect("WS connect failed");

        let json = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert_eq!(json["type"], "agents_sync");
        assert_eq!(json["agents"][0]["id"], id);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_receives_started_and_stopped_events() {
    timeout(TEST_TIMEOUT, async {
        let (port, coordinator) = start_server().await;

        let (mut ws, _resp) = connect_async(format!("ws://127.0.0.1:{port}/ws/agents"))
            .await
            .expect("WS connect failed");
        let sync = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert!(sync["agents"].as_array().unwrap().is_empty());

        let id = coordinator.start("Documentation Agent").await.unwrap();
        let started = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert_eq!(started["type"], "agent_started");
        assert_eq!(started["id"], id);
        assert_eq!(started["kind"], "Documentation Agent");

        coordinator.stop(&id).await;
        let stopped = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert_eq!(stopped["type"], "agent_stopped");
        assert_eq!(stopped["id"], id);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn ws_stop_all_delivers_one_event_per_agent() {
    timeout(TEST_TIMEOUT, async {
        let (port, coordinator) = start_server().await;
        let mut started = HashSet::new();
        for kind in AgentKind::ALL {
            started.insert(coordinator.start(kind.token()).await.unwrap());
        }

        let (mut ws, _resp) = connect_async(format!("ws://127.0.0.1:{port}/ws/agents"))
            .await
            .expect("WS connect failed");
        let sync = parse_ws_json(&ws.next().await.unwrap().unwrap());
        assert_eq!(sync["agents"].as_array().unwrap().len(), 4);

        coordinator.stop_all().await;

        let mut stopped = HashSet::new();
        while stopped.len() < started.len() {
            let event = parse_ws_json(&ws.next().await.unwrap().unwrap());
            assert_eq!(event["type"], "agent_stopped");
            stopped.insert(event["id"].as_str().unwrap().to_string());
        }
        assert_eq!(stopped, started);
    })
    .await
    .expect("test timed out");
}
