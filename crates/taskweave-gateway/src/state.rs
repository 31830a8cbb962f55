use std::sync::Arc;

use taskweave_agents::AgentRegistry;
use taskweave_engine::ExecutionEngine;
use taskweave_tools::ToolRegistry;

/// Shared application state for axum handlers.
pub struct AppState {
    pub engine: Arc<ExecutionEngine>,
    pub agents: Arc<AgentRegistry>,
    pub tools: Arc<ToolRegistry>,
}
