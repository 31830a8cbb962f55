use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::json;

use taskweave_agents::AgentRegistry;
use taskweave_core::config::EngineConfig;
use taskweave_core::traits::Agent;
use taskweave_core::types::{
    AgentSpec, AgentStatus, JsonMap, WorkflowRequest, WorkflowStatus,
};
use taskweave_engine::{templates, ExecutionEngine};
use taskweave_tools::ToolRegistry;

fn map(value: serde_json::Value) -> JsonMap {
    value.as_object().expect("object literal").clone()
}

fn engine_with_builtins() -> ExecutionEngine {
    let tools = Arc::new(ToolRegistry::with_builtins());
    let agents = Arc::new(AgentRegistry::with_builtins(tools));
    ExecutionEngine::new(agents, EngineConfig::default())
}

#[tokio::test]
async fn test_linear_chain_all_succeed() {
    let engine = engine_with_builtins();

    let request = WorkflowRequest {
        workflow_id: Some("linear".into()),
        initial_input: JsonMap::new(),
        agents: vec![
            AgentSpec::new("a", "data_fetcher").with_config(map(json!({"data": 10}))),
            AgentSpec::new("b", "calculator")
                .with_inputs(vec!["a".into()])
                .with_config(map(json!({"operation": "add", "const": 5}))),
        ],
        continue_on_error: false,
    };

    let result = engine.execute(request).await;

    assert_eq!(result.status, WorkflowStatus::Success);
    assert!(result.agent_results.values().all(|r| r.is_success()));
    assert_eq!(result.agent_results["b"].output["result"], json!(15.0));
}

/// Records when each agent started, so tests can assert that agents of
/// one layer run in overlapping windows.
struct RecordingAgent {
    spec: AgentSpec,
    starts: Arc<Mutex<Vec<(String, tokio::time::Instant)>>>,
}

impl Agent for RecordingAgent {
    fn agent_id(&self) -> &str {
        &self.spec.agent_id
    }
    fn agent_type(&self) -> &str {
        &self.spec.agent_type
    }
    fn max_retries(&self) -> u32 {
        self.spec.max_retries
    }
    fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.spec.timeout_seconds)
    }
    fn run(&self, _inputs: JsonMap) -> BoxFuture<'_, taskweave_core::Result<JsonMap>> {
        Box::pin(async move {
            self.starts
                .lock()
                .unwrap()
                .push((self.spec.agent_id.clone(), tokio::time::Instant::now()));
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(JsonMap::new())
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_diamond_siblings_run_concurrently() {
    let starts: Arc<Mutex<Vec<(String, tokio::time::Instant)>>> = Arc::new(Mutex::new(Vec::new()));

    let tools = Arc::new(ToolRegistry::with_builtins());
    let mut agents = AgentRegistry::with_builtins(tools);
    let starts_for_factory = starts.clone();
    agents
        .register("recording", "Records start times.", move |spec| {
            Ok(Arc::new(RecordingAgent {
                spec: spec.clone(),
                starts: starts_for_factory.clone(),
            }) as Arc<dyn Agent>)
        })
        .expect("register recording agent");

    let engine = ExecutionEngine::new(Arc::new(agents), EngineConfig::default());

    let request = WorkflowRequest {
        workflow_id: Some("diamond".into()),
        initial_input: JsonMap::new(),
        agents: vec![
            AgentSpec::new("a", "recording"),
            AgentSpec::new("b", "recording").with_inputs(vec!["a".into()]),
            AgentSpec::new("c", "recording").with_inputs(vec!["a".into()]),
            AgentSpec::new("d", "recording").with_inputs(vec!["b".into(), "c".into()]),
        ],
        continue_on_error: false,
    };

    let result = engine.execute(request).await;
    assert_eq!(result.status, WorkflowStatus::Success);

    let starts = starts.lock().unwrap().clone();
    let start_of = |id: &str| {
        starts
            .iter()
            .find(|(agent, _)| agent == id)
            .map(|(_, at)| *at)
            .expect("agent started")
    };

    // Siblings b and c start in overlapping windows.
    let (b, c) = (start_of("b"), start_of("c"));
    let sibling_gap = if b > c { b - c } else { c - b };
    assert!(sibling_gap < Duration::from_secs(1), "gap {sibling_gap:?}");

    // The DAG's partial order is respected.
    assert!(start_of("a") < start_of("b"));
    assert!(start_of("b") + Duration::from_secs(1) <= start_of("d"));
    assert!(start_of("c") + Duration::from_secs(1) <= start_of("d"));
}

#[tokio::test]
async fn test_diamond_template_end_to_end() {
    let engine = engine_with_builtins();
    let request = templates::template("diamond_stats").expect("template");

    let result = engine.execute(request).await;

    assert_eq!(result.status, WorkflowStatus::Success);
    assert_eq!(result.agent_results["total"].output["result"], json!(6.0));
    assert_eq!(result.agent_results["peak"].output["result"], json!(3.0));
    assert_eq!(
        result.agent_results["chart"].output["series"],
        json!([
            {"label": "peak", "value": 3.0},
            {"label": "total", "value": 6.0}
        ])
    );
}

/// Sleeps far past any test horizon; only cancellation ends it.
struct StallAgent {
    spec: AgentSpec,
}

impl Agent for StallAgent {
    fn agent_id(&self) -> &str {
        &self.spec.agent_id
    }
    fn agent_type(&self) -> &str {
        &self.spec.agent_type
    }
    fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.spec.timeout_seconds)
    }
    fn run(&self, _inputs: JsonMap) -> BoxFuture<'_, taskweave_core::Result<JsonMap>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(JsonMap::new())
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_is_idempotent_and_terminal() {
    let tools = Arc::new(ToolRegistry::with_builtins());
    let mut agents = AgentRegistry::with_builtins(tools);
    agents
        .register("stall", "Sleeps for a long time.", |spec| {
            Ok(Arc::new(StallAgent { spec: spec.clone() }) as Arc<dyn Agent>)
        })
        .expect("register stall agent");

    let engine = Arc::new(ExecutionEngine::new(Arc::new(agents), EngineConfig::default()));

    let request = WorkflowRequest {
        workflow_id: Some("wf-stall".into()),
        initial_input: JsonMap::new(),
        agents: vec![AgentSpec::new("s", "stall").with_timeout(900.0)],
        continue_on_error: false,
    };

    let task = tokio::spawn({
        let engine = engine.clone();
        async move { engine.execute(request).await }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(engine.list_active(), vec!["wf-stall".to_string()]);
    assert!(engine.cancel("wf-stall"));

    let result = task.await.expect("execute task");
    assert_eq!(result.status, WorkflowStatus::Cancelled);
    assert_eq!(result.agent_results["s"].status, AgentStatus::Cancelled);

    // Second cancel finds no active workflow and changes nothing.
    assert!(!engine.cancel("wf-stall"));
    let snapshot = engine.status("wf-stall").expect("snapshot retained");
    assert_eq!(snapshot.status, WorkflowStatus::Cancelled);
    assert!(snapshot.finished_at.is_some());
}

#[tokio::test]
async fn test_request_json_round_trip_through_file() {
    let raw = json!({
        "workflow_id": "from-file",
        "initial_input": {"seed": 42},
        "agents": [
            {"agent_id": "fetch", "agent_type": "data_fetcher", "config": {"data": [5, 7]}},
            {
                "agent_id": "sum",
                "agent_type": "data_processor",
                "inputs": ["fetch"],
                "config": {"operation": "sum"},
                "max_retries": 0,
                "timeout_seconds": 10.0
            }
        ]
    });

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("workflow.json");
    std::fs::write(&path, serde_json::to_string_pretty(&raw).expect("encode"))
        .expect("write workflow file");

    let content = std::fs::read_to_string(&path).expect("read workflow file");
    let request: WorkflowRequest = serde_json::from_str(&content).expect("parse request");

    // Parse → re-serialize → parse yields the same request.
    let round_tripped: WorkflowRequest =
        serde_json::from_str(&serde_json::to_string(&request).expect("encode"))
            .expect("reparse");
    assert_eq!(round_tripped.workflow_id, request.workflow_id);
    assert_eq!(round_tripped.agents.len(), request.agents.len());
    assert_eq!(round_tripped.initial_input, request.initial_input);

    let engine = engine_with_builtins();
    let result = engine.execute(request).await;
    assert_eq!(result.status, WorkflowStatus::Success);
    assert_eq!(result.agent_results["sum"].output["result"], json!(12.0));
}
