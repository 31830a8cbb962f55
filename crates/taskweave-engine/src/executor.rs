use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use taskweave_agents::AgentRegistry;
use taskweave_core::config::EngineConfig;
use taskweave_core::error::{Result, TaskweaveError};
use taskweave_core::traits::Agent;
use taskweave_core::types::{
    AgentResult, AgentSpec, AgentStatus, JsonMap, WorkflowRequest, WorkflowResult, WorkflowStatus,
};

use crate::dag::WorkflowDag;

/// Executes workflows layer by layer.
///
/// Agents within a layer run concurrently; no agent of the next layer
/// starts before every agent of the current layer reached a terminal
/// state. Each agent is driven under its own retry/backoff/timeout
/// policy, and the whole workflow can be cancelled cooperatively.
pub struct ExecutionEngine {
    registry: Arc<AgentRegistry>,
    active: Mutex<HashMap<String, CancellationToken>>,
    snapshots: Mutex<SnapshotStore>,
    limiter: Option<Arc<Semaphore>>,
}

impl ExecutionEngine {
    pub fn new(registry: Arc<AgentRegistry>, config: EngineConfig) -> Self {
        Self {
            registry,
            active: Mutex::new(HashMap::new()),
            snapshots: Mutex::new(SnapshotStore::new(config.max_retained_workflows)),
            limiter: config
                .max_concurrent_workflows
                .map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Run a workflow to a terminal status.
    ///
    /// Validation failures (malformed graph, unknown agent types,
    /// missing tools) never raise: they produce a `failed` result with
    /// `error` set and an empty result map.
    pub async fn execute(&self, request: WorkflowRequest) -> WorkflowResult {
        let workflow_id = request
            .workflow_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let token = CancellationToken::new();
        self.active
            .lock()
            .unwrap()
            .insert(workflow_id.clone(), token.clone());

        let mut result = WorkflowResult::running(&workflow_id);
        self.store_snapshot(result.clone());

        info!(
            workflow_id = %workflow_id,
            agents = request.agents.len(),
            "Starting workflow execution"
        );

        if let Err(e) = self.run_layers(&request, &token, &mut result).await {
            result.status = WorkflowStatus::Failed;
            result.error = Some(e.to_string());
            if e.is_validation() {
                warn!(workflow_id = %workflow_id, error = %e, "Workflow rejected");
            } else {
                error!(workflow_id = %workflow_id, error = %e, "Workflow failed internally");
            }
        }

        result.finished_at = Some(Utc::now());
        self.active.lock().unwrap().remove(&workflow_id);
        self.store_snapshot(result.clone());

        info!(
            workflow_id = %workflow_id,
            status = ?result.status,
            agents = result.agent_results.len(),
            "Workflow finished"
        );
        result
    }

    /// Latest known snapshot for a workflow, running or finished.
    pub fn status(&self, workflow_id: &str) -> Option<WorkflowResult> {
        self.snapshots.lock().unwrap().get(workflow_id)
    }

    /// Request cooperative cancellation. Returns whether a running
    /// workflow was found; safe to call repeatedly.
    pub fn cancel(&self, workflow_id: &str) -> bool {
        let active = self.active.lock().unwrap();
        match active.get(workflow_id) {
            Some(token) => {
                info!(workflow_id = %workflow_id, "Cancellation requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Ids of workflows currently executing.
    pub fn list_active(&self) -> Vec<String> {
        self.active.lock().unwrap().keys().cloned().collect()
    }

    async fn run_layers(
        &self,
        request: &WorkflowRequest,
        token: &CancellationToken,
        result: &mut WorkflowResult,
    ) -> Result<()> {
        let dag = WorkflowDag::new(&request.agents)?;

        // Resolve every agent up front so a registry miss fails the
        // submission before anything runs.
        let mut agents: HashMap<String, Arc<dyn Agent>> = HashMap::with_capacity(dag.len());
        for spec in &request.agents {
            agents.insert(spec.agent_id.clone(), self.registry.create(spec)?);
        }

        let _permit = match &self.limiter {
            Some(semaphore) => Some(
                semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| TaskweaveError::Internal("workflow limiter closed".into()))?,
            ),
            None => None,
        };

        let mut cancelled = false;

        for (index, layer) in dag.layers().into_iter().enumerate() {
            if token.is_cancelled() {
                cancelled = true;
                break;
            }

            debug!(
                workflow_id = %result.workflow_id,
                layer = index,
                agents = layer.len(),
                "Executing layer"
            );

            let mut handles = Vec::with_capacity(layer.len());
            for agent_id in &layer {
                let spec = dag
                    .get(agent_id)
                    .ok_or_else(|| TaskweaveError::Internal(format!("missing spec '{agent_id}'")))?;

                if request.continue_on_error {
                    let failed_upstream = dag
                        .dependencies(agent_id)
                        .iter()
                        .find(|dep| !upstream_succeeded(&result.agent_results, dep));
                    if let Some(dep) = failed_upstream {
                        debug!(agent_id = %agent_id, upstream = %dep, "Skipping agent");
                        result.agent_results.insert(
                            agent_id.clone(),
                            AgentResult::skipped(
                                agent_id.clone(),
                                format!("upstream agent '{dep}' did not succeed"),
                            ),
                        );
                        continue;
                    }
                }

                let inputs = gather_inputs(
                    spec,
                    dag.dependencies(agent_id),
                    &result.agent_results,
                    &request.initial_input,
                )?;
                let agent = agents[agent_id].clone();

                // All tasks of a layer are spawned before any is awaited.
                handles.push(tokio::spawn(run_agent(agent, inputs, token.child_token())));
            }

            for handle in handles {
                let agent_result = handle
                    .await
                    .map_err(|e| TaskweaveError::Internal(format!("agent task failed: {e}")))?;
                result
                    .agent_results
                    .insert(agent_result.agent_id.clone(), agent_result);
            }

            self.store_snapshot(result.clone());

            if token.is_cancelled()
                || result
                    .agent_results
                    .values()
                    .any(|r| r.status == AgentStatus::Cancelled)
            {
                cancelled = true;
                break;
            }

            if !request.continue_on_error && has_failure(&result.agent_results) {
                warn!(
                    workflow_id = %result.workflow_id,
                    layer = index,
                    "Agent failure, halting workflow"
                );
                break;
            }
        }

        result.status = if cancelled {
            WorkflowStatus::Cancelled
        } else if request.continue_on_error {
            let any_success = result.agent_results.values().any(AgentResult::is_success);
            let any_failure = result.agent_results.values().any(|r| !r.is_success());
            match (any_success, any_failure) {
                (_, false) => WorkflowStatus::Success,
                (true, true) => WorkflowStatus::Partial,
                (false, true) => WorkflowStatus::Failed,
            }
        } else if has_failure(&result.agent_results) {
            WorkflowStatus::Failed
        } else {
            WorkflowStatus::Success
        };

        Ok(())
    }

    fn store_snapshot(&self, result: WorkflowResult) {
        self.snapshots.lock().unwrap().insert(result);
    }
}

fn has_failure(results: &HashMap<String, AgentResult>) -> bool {
    results
        .values()
        .any(|r| matches!(r.status, AgentStatus::Failed | AgentStatus::Timeout))
}

fn upstream_succeeded(results: &HashMap<String, AgentResult>, agent_id: &str) -> bool {
    results
        .get(agent_id)
        .map(AgentResult::is_success)
        .unwrap_or(false)
}

/// Compose the invocation mapping for one agent: the initial input for
/// source agents, `{upstream_id: upstream_output}` otherwise, with the
/// agent's config winning on key collisions.
fn gather_inputs(
    spec: &AgentSpec,
    dependencies: &[String],
    results: &HashMap<String, AgentResult>,
    initial_input: &JsonMap,
) -> Result<JsonMap> {
    let mut inputs = if dependencies.is_empty() {
        initial_input.clone()
    } else {
        let mut upstream = JsonMap::new();
        for dep in dependencies {
            let result = results.get(dep).ok_or_else(|| {
                TaskweaveError::Internal(format!("dependency '{dep}' has no result"))
            })?;
            if !result.is_success() {
                return Err(TaskweaveError::Internal(format!(
                    "dependency '{dep}' did not succeed"
                )));
            }
            upstream.insert(dep.clone(), Value::Object(result.output.clone()));
        }
        upstream
    };

    for (key, value) in &spec.config {
        inputs.insert(key.clone(), value.clone());
    }
    Ok(inputs)
}

/// Drive a single agent through its retry/timeout loop.
///
/// Cancellation short-circuits both the in-flight attempt and the
/// backoff sleep; a cancelled agent is never retried.
async fn run_agent(
    agent: Arc<dyn Agent>,
    inputs: JsonMap,
    cancel: CancellationToken,
) -> AgentResult {
    let agent_id = agent.agent_id().to_string();
    let max_retries = agent.max_retries();
    let timeout = agent.timeout();
    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        let attempt = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(agent_id = %agent_id, attempts, "Agent cancelled mid-flight");
                return AgentResult::failure(
                    agent_id,
                    AgentStatus::Cancelled,
                    "cancelled",
                    attempts,
                    started.elapsed().as_secs_f64(),
                );
            }
            outcome = tokio::time::timeout(timeout, agent.run(inputs.clone())) => outcome,
        };

        let (status, message) = match attempt {
            Ok(Ok(output)) => {
                debug!(agent_id = %agent_id, attempts, "Agent completed");
                return AgentResult::success(
                    agent_id,
                    output,
                    attempts,
                    started.elapsed().as_secs_f64(),
                );
            }
            Ok(Err(e)) => (AgentStatus::Failed, e.to_string()),
            Err(_) => (
                AgentStatus::Timeout,
                format!("timed out after {:.1}s", timeout.as_secs_f64()),
            ),
        };

        if attempts > max_retries {
            let error = match status {
                AgentStatus::Timeout => format!("timeout after {attempts} attempts"),
                _ => format!("{message} (after {attempts} attempts)"),
            };
            warn!(agent_id = %agent_id, attempts, error = %error, "Agent exhausted retries");
            return AgentResult::failure(
                agent_id,
                status,
                error,
                attempts,
                started.elapsed().as_secs_f64(),
            );
        }

        let delay = backoff_delay(attempts);
        debug!(
            agent_id = %agent_id,
            attempt = attempts,
            backoff_ms = delay.as_millis() as u64,
            error = %message,
            "Retrying agent"
        );
        tokio::select! {
            _ = cancel.cancelled() => {
                return AgentResult::failure(
                    agent_id,
                    AgentStatus::Cancelled,
                    "cancelled",
                    attempts,
                    started.elapsed().as_secs_f64(),
                );
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Exponential backoff: 1s, 2s, 4s, ... capped at 60s, with up to 25%
/// upward jitter so the schedule's lower bound always holds.
fn backoff_delay(attempt: u32) -> Duration {
    let secs = 2u64.saturating_pow(attempt.saturating_sub(1)).min(60);
    let jitter = 1.0 + rand::random::<f64>() * 0.25;
    Duration::from_secs_f64(secs as f64 * jitter)
}

/// Completed workflow results kept queryable, bounded by insertion-order
/// eviction.
struct SnapshotStore {
    results: HashMap<String, WorkflowResult>,
    insertion_order: VecDeque<String>,
    capacity: usize,
}

impl SnapshotStore {
    fn new(capacity: usize) -> Self {
        Self {
            results: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn insert(&mut self, result: WorkflowResult) {
        let workflow_id = result.workflow_id.clone();
        if self.results.insert(workflow_id.clone(), result).is_none() {
            self.insertion_order.push_back(workflow_id);
            while self.results.len() > self.capacity {
                match self.insertion_order.pop_front() {
                    Some(oldest) => {
                        self.results.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
    }

    fn get(&self, workflow_id: &str) -> Option<WorkflowResult> {
        self.results.get(workflow_id).cloned()
    }
}
