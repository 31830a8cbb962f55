use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use taskweave_core::error::Result;
use taskweave_core::traits::{Agent, Tool};
use taskweave_core::types::{AgentSpec, JsonMap};

/// Turns an agent's composed input mapping into tool parameters.
///
/// The engine hands every agent its config merged over upstream outputs
/// (or the workflow's initial input); the shaper adapts that mapping to
/// what the underlying tool expects.
pub type ParamShaper = fn(&AgentSpec, &JsonMap) -> JsonMap;

/// Agent backed by a registered tool.
///
/// Identity and retry/timeout policy come from the spec; execution is
/// delegated to the tool after parameter shaping.
pub struct ToolAgent {
    spec: AgentSpec,
    tool: Arc<dyn Tool>,
    shape: ParamShaper,
}

impl ToolAgent {
    pub fn new(spec: AgentSpec, tool: Arc<dyn Tool>, shape: ParamShaper) -> Self {
        Self { spec, tool, shape }
    }
}

impl Agent for ToolAgent {
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

    fn run(&self, inputs: JsonMap) -> BoxFuture<'_, Result<JsonMap>> {
        let params = (self.shape)(&self.spec, &inputs);
        Box::pin(async move { self.tool.execute(params).await })
    }
}
