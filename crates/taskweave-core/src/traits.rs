use std::time::Duration;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::types::JsonMap;

/// Tool — a reusable unit of computation agents can invoke.
///
/// Tools must be safe to invoke concurrently from multiple agents and
/// hold no per-invocation mutable state.
pub trait Tool: Send + Sync + 'static {
    /// Stable tool name (registry key).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Execute with the given parameter mapping, returning a result mapping.
    fn execute(&self, params: JsonMap) -> BoxFuture<'_, Result<JsonMap>>;
}

impl std::fmt::Debug for dyn Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name())
            .finish()
    }
}

/// Agent — a named, retriable, timeout-bounded unit of work.
///
/// The engine composes each agent's invocation mapping from upstream
/// outputs (or the workflow's initial input) and drives `run` under the
/// agent's retry and timeout policy.
pub trait Agent: Send + Sync + 'static {
    /// Identifier unique within the owning workflow.
    fn agent_id(&self) -> &str;

    /// Registered type this agent was created from.
    fn agent_type(&self) -> &str;

    /// Retry attempts after the first failure.
    fn max_retries(&self) -> u32 {
        3
    }

    /// Per-attempt deadline.
    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    /// Execute the agent with the composed input mapping.
    fn run(&self, inputs: JsonMap) -> BoxFuture<'_, Result<JsonMap>>;
}

impl std::fmt::Debug for dyn Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("agent_id", &self.agent_id())
            .field("agent_type", &self.agent_type())
            .finish()
    }
}
