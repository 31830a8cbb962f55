use std::collections::HashMap;
use std::sync::Arc;

use taskweave_core::error::{Result, TaskweaveError};
use taskweave_core::traits::Agent;
use taskweave_core::types::{AgentSpec, AgentTypeInfo};
use taskweave_tools::ToolRegistry;

/// Builds an agent instance from its workflow spec.
pub type AgentFactory = Arc<dyn Fn(&AgentSpec) -> Result<Arc<dyn Agent>> + Send + Sync>;

struct RegisteredType {
    description: String,
    factory: AgentFactory,
}

/// Registry of available agent types.
///
/// Each type maps to a factory; `create` instantiates an agent from an
/// `AgentSpec`. Like the tool registry, writes happen at startup and the
/// registry is then shared as `Arc<AgentRegistry>`.
pub struct AgentRegistry {
    types: HashMap<String, RegisteredType>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register an agent type. Fails if the type already exists.
    pub fn register<F>(
        &mut self,
        agent_type: impl Into<String>,
        description: impl Into<String>,
        factory: F,
    ) -> Result<()>
    where
        F: Fn(&AgentSpec) -> Result<Arc<dyn Agent>> + Send + Sync + 'static,
    {
        let agent_type = agent_type.into();
        if self.types.contains_key(&agent_type) {
            return Err(TaskweaveError::AgentTypeAlreadyRegistered(agent_type));
        }
        self.types.insert(
            agent_type,
            RegisteredType {
                description: description.into(),
                factory: Arc::new(factory),
            },
        );
        Ok(())
    }

    /// Register an agent type, replacing any existing registration.
    pub fn register_overwrite<F>(
        &mut self,
        agent_type: impl Into<String>,
        description: impl Into<String>,
        factory: F,
    ) where
        F: Fn(&AgentSpec) -> Result<Arc<dyn Agent>> + Send + Sync + 'static,
    {
        self.types.insert(
            agent_type.into(),
            RegisteredType {
                description: description.into(),
                factory: Arc::new(factory),
            },
        );
    }

    /// Remove an agent type from the registry.
    pub fn unregister(&mut self, agent_type: &str) -> bool {
        self.types.remove(agent_type).is_some()
    }

    /// Whether the given agent type is registered.
    pub fn contains(&self, agent_type: &str) -> bool {
        self.types.contains_key(agent_type)
    }

    /// Instantiate an agent from a spec, resolving its type.
    pub fn create(&self, spec: &AgentSpec) -> Result<Arc<dyn Agent>> {
        let registered = self
            .types
            .get(&spec.agent_type)
            .ok_or_else(|| TaskweaveError::UnknownAgentType(spec.agent_type.clone()))?;
        (registered.factory)(spec)
    }

    /// List registered agent types as type + description pairs.
    pub fn list(&self) -> Vec<AgentTypeInfo> {
        let mut infos: Vec<AgentTypeInfo> = self
            .types
            .iter()
            .map(|(agent_type, registered)| AgentTypeInfo {
                agent_type: agent_type.clone(),
                description: registered.description.clone(),
            })
            .collect();
        infos.sort_by(|a, b| a.agent_type.cmp(&b.agent_type));
        infos
    }

    /// Create a registry with all built-in agent types registered.
    pub fn with_builtins(tools: Arc<ToolRegistry>) -> Self {
        let mut registry = Self::new();
        crate::builtin::register_builtin_agents(&mut registry, &tools);
        registry
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let tools = Arc::new(ToolRegistry::with_builtins());
        let registry = AgentRegistry::with_builtins(tools);
        let types: Vec<String> = registry.list().into_iter().map(|a| a.agent_type).collect();
        assert_eq!(
            types,
            vec![
                "calculator",
                "chart_generator",
                "data_fetcher",
                "data_processor"
            ]
        );
    }

    #[test]
    fn test_create_unknown_type() {
        let registry = AgentRegistry::new();
        let spec = AgentSpec::new("a", "nope");
        let err = registry.create(&spec).expect_err("unknown type must fail");
        assert!(matches!(err, TaskweaveError::UnknownAgentType(_)));
    }

    #[test]
    fn test_create_resolves_tool_at_creation() {
        // A registry whose tools are missing surfaces the miss when the
        // agent is created, not when it first runs.
        let tools = Arc::new(ToolRegistry::new());
        let registry = AgentRegistry::with_builtins(tools);
        let spec = AgentSpec::new("calc", "calculator");
        let err = registry.create(&spec).expect_err("missing tool must fail");
        assert!(matches!(err, TaskweaveError::ToolNotFound(_)));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let tools = Arc::new(ToolRegistry::with_builtins());
        let mut registry = AgentRegistry::with_builtins(tools);
        let err = registry
            .register("calculator", "dup", |_spec| {
                Err(TaskweaveError::Internal("unused".into()))
            })
            .expect_err("duplicate type must fail");
        assert!(matches!(err, TaskweaveError::AgentTypeAlreadyRegistered(_)));
    }
}
