use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form string → JSON value mapping used for tool parameters,
/// agent config, and agent outputs.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Terminal state of a single agent execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Success,
    Failed,
    Timeout,
    Cancelled,
    Skipped,
}

/// Aggregate state of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Running,
    Success,
    Partial,
    Failed,
    Cancelled,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkflowStatus::Running)
    }
}

/// Declarative element of a workflow: one agent, its dependencies,
/// and its retry/timeout policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique identifier within the workflow.
    pub agent_id: String,
    /// Registered agent type to instantiate.
    pub agent_type: String,
    /// Agent ids this agent depends on (empty = source agent).
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Agent-specific configuration, merged over the collected inputs.
    #[serde(default)]
    pub config: JsonMap,
    /// Retry attempts after the first failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-attempt deadline in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_seconds() -> f64 {
    30.0
}

impl AgentSpec {
    /// Create a spec with default retry/timeout policy.
    pub fn new(agent_id: impl Into<String>, agent_type: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_type: agent_type.into(),
            inputs: vec![],
            config: JsonMap::new(),
            max_retries: default_max_retries(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Set the upstream dependencies.
    pub fn with_inputs(mut self, inputs: Vec<String>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Set the configuration mapping.
    pub fn with_config(mut self, config: JsonMap) -> Self {
        self.config = config;
        self
    }

    /// Set the retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the per-attempt timeout in seconds.
    pub fn with_timeout(mut self, timeout_seconds: f64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// A workflow submission: agents, their dependency edges (via
/// `AgentSpec::inputs`), and the payload handed to source agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRequest {
    /// Assigned by the engine when absent.
    #[serde(default)]
    pub workflow_id: Option<String>,
    /// Input mapping supplied to all source agents.
    #[serde(default)]
    pub initial_input: JsonMap,
    pub agents: Vec<AgentSpec>,
    /// When true, a failed upstream marks dependents `skipped` instead of
    /// stopping the workflow, and the aggregate status may be `partial`.
    #[serde(default)]
    pub continue_on_error: bool,
}

/// Outcome of a single agent execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_id: String,
    pub status: AgentStatus,
    #[serde(default)]
    pub output: JsonMap,
    #[serde(default)]
    pub error: Option<String>,
    pub attempts: u32,
    pub duration_seconds: f64,
}

impl AgentResult {
    pub fn success(
        agent_id: impl Into<String>,
        output: JsonMap,
        attempts: u32,
        duration_seconds: f64,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            status: AgentStatus::Success,
            output,
            error: None,
            attempts,
            duration_seconds,
        }
    }

    pub fn failure(
        agent_id: impl Into<String>,
        status: AgentStatus,
        error: impl Into<String>,
        attempts: u32,
        duration_seconds: f64,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            status,
            output: JsonMap::new(),
            error: Some(error.into()),
            attempts,
            duration_seconds,
        }
    }

    pub fn skipped(agent_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            status: AgentStatus::Skipped,
            output: JsonMap::new(),
            error: Some(error.into()),
            attempts: 0,
            duration_seconds: 0.0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AgentStatus::Success
    }
}

/// Aggregate result of a workflow run. Snapshots of in-flight workflows
/// carry status `running` and only the agent results merged so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub workflow_id: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub agent_results: HashMap<String, AgentResult>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl WorkflowResult {
    /// Fresh in-flight result for a just-submitted workflow.
    pub fn running(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            status: WorkflowStatus::Running,
            agent_results: HashMap::new(),
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        }
    }
}

/// Name + description pair describing a registered tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Type + description pair describing a registered agent type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTypeInfo {
    pub agent_type: String,
    pub description: String,
}
