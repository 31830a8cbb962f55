use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskweaveError {
    // Workflow validation errors
    #[error("duplicate agent id: {0}")]
    DuplicateAgentId(String),

    #[error("agent '{agent_id}' depends on unknown agent '{dependency}'")]
    UnknownDependency {
        agent_id: String,
        dependency: String,
    },

    #[error("cycle detected in workflow: {from} -> {to}")]
    CycleDetected { from: String, to: String },

    #[error("invalid agent spec '{agent_id}': {message}")]
    InvalidSpec { agent_id: String, message: String },

    #[error("unknown agent type: {0}")]
    UnknownAgentType(String),

    // Registry errors
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("tool already registered: {0}")]
    ToolAlreadyRegistered(String),

    #[error("agent type already registered: {0}")]
    AgentTypeAlreadyRegistered(String),

    // Tool errors
    #[error("tool execution failed: {tool}: {message}")]
    ToolExecution { tool: String, message: String },

    #[error("invalid tool parameters: {0}")]
    ToolValidation(String),

    // Engine errors
    #[error("internal error: {0}")]
    Internal(String),

    // Config errors
    #[error("config error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TaskweaveError {
    /// Whether this error represents a malformed workflow request,
    /// detectable at submission time before any agent has run.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TaskweaveError::DuplicateAgentId(_)
                | TaskweaveError::UnknownDependency { .. }
                | TaskweaveError::CycleDetected { .. }
                | TaskweaveError::InvalidSpec { .. }
                | TaskweaveError::UnknownAgentType(_)
                | TaskweaveError::ToolNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TaskweaveError>;
