use std::collections::HashMap;
use std::sync::Arc;

use taskweave_core::error::{Result, TaskweaveError};
use taskweave_core::traits::Tool;
use taskweave_core::types::ToolInfo;

/// Registry of available tools.
///
/// Writes happen at startup; afterwards the registry is shared as
/// `Arc<ToolRegistry>` and read concurrently. Tests construct their own
/// instances instead of relying on process-wide state.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Fails if a tool with the same name exists.
    pub fn register(&mut self, tool: impl Tool) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(TaskweaveError::ToolAlreadyRegistered(name));
        }
        self.tools.insert(name, Arc::new(tool));
        Ok(())
    }

    /// Register a tool, replacing any existing one with the same name.
    pub fn register_overwrite(&mut self, tool: impl Tool) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    /// Unregister a tool by name.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.tools.remove(name).is_some()
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| TaskweaveError::ToolNotFound(name.to_string()))
    }

    /// List all registered tools as name + description pairs.
    pub fn list(&self) -> Vec<ToolInfo> {
        let mut infos: Vec<ToolInfo> = self
            .tools
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Create a registry with all built-in tools registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_overwrite(crate::builtin::calculator::CalculatorTool);
        registry.register_overwrite(crate::builtin::data_fetcher::DataFetcherTool);
        registry.register_overwrite(crate::builtin::data_processor::DataProcessorTool);
        registry.register_overwrite(crate::builtin::chart_generator::ChartGeneratorTool);
        registry
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = ToolRegistry::with_builtins();
        let names: Vec<String> = registry.list().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "calculator",
                "chart_generator",
                "data_fetcher",
                "data_processor"
            ]
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::with_builtins();
        let err = registry
            .register(crate::builtin::calculator::CalculatorTool)
            .expect_err("duplicate must fail");
        assert!(matches!(err, TaskweaveError::ToolAlreadyRegistered(_)));

        // Overwrite is allowed explicitly
        registry.register_overwrite(crate::builtin::calculator::CalculatorTool);
    }

    #[test]
    fn test_get_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.get("nope").expect_err("must be missing");
        assert!(matches!(err, TaskweaveError::ToolNotFound(_)));
    }

    #[test]
    fn test_unregister() {
        let mut registry = ToolRegistry::with_builtins();
        assert!(registry.unregister("calculator"));
        assert!(!registry.unregister("calculator"));
        assert!(registry.get("calculator").is_err());
    }
}
