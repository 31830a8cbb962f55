use std::collections::{HashMap, HashSet};

use taskweave_core::error::{Result, TaskweaveError};
use taskweave_core::types::AgentSpec;

/// Validated workflow graph: agents as nodes, declared inputs as edges.
///
/// Construction rejects duplicate ids, dangling dependencies, invalid
/// retry/timeout fields, and cycles. Layering partitions the graph into
/// groups that can run concurrently.
#[derive(Debug)]
pub struct WorkflowDag {
    /// Agent ids in declaration order.
    order: Vec<String>,
    specs: HashMap<String, AgentSpec>,
    /// Deduplicated direct dependencies per agent, in declaration order.
    dependencies: HashMap<String, Vec<String>>,
    /// Reverse edges: agent id -> agents that depend on it.
    dependents: HashMap<String, Vec<String>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

impl WorkflowDag {
    pub fn new(agents: &[AgentSpec]) -> Result<Self> {
        let mut order = Vec::with_capacity(agents.len());
        let mut specs = HashMap::with_capacity(agents.len());

        for spec in agents {
            if spec.agent_id.is_empty() {
                return Err(TaskweaveError::InvalidSpec {
                    agent_id: spec.agent_id.clone(),
                    message: "agent_id must not be empty".into(),
                });
            }
            if !(spec.timeout_seconds > 0.0) {
                return Err(TaskweaveError::InvalidSpec {
                    agent_id: spec.agent_id.clone(),
                    message: format!(
                        "timeout_seconds must be positive (got {})",
                        spec.timeout_seconds
                    ),
                });
            }
            if specs.insert(spec.agent_id.clone(), spec.clone()).is_some() {
                return Err(TaskweaveError::DuplicateAgentId(spec.agent_id.clone()));
            }
            order.push(spec.agent_id.clone());
        }

        let mut dependencies: HashMap<String, Vec<String>> = HashMap::with_capacity(agents.len());
        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();

        for spec in agents {
            let mut seen = HashSet::new();
            let mut deps = Vec::new();
            for dependency in &spec.inputs {
                if !specs.contains_key(dependency) {
                    return Err(TaskweaveError::UnknownDependency {
                        agent_id: spec.agent_id.clone(),
                        dependency: dependency.clone(),
                    });
                }
                if seen.insert(dependency.clone()) {
                    deps.push(dependency.clone());
                    dependents
                        .entry(dependency.clone())
                        .or_default()
                        .push(spec.agent_id.clone());
                }
            }
            dependencies.insert(spec.agent_id.clone(), deps);
        }

        let dag = Self {
            order,
            specs,
            dependencies,
            dependents,
        };
        dag.check_acyclic()?;
        Ok(dag)
    }

    /// DFS with gray/black coloring; a gray neighbor is a back edge on a
    /// cycle and names the offending edge in the error.
    fn check_acyclic(&self) -> Result<()> {
        let mut colors: HashMap<&str, Color> = HashMap::with_capacity(self.order.len());
        for id in &self.order {
            if colors.get(id.as_str()).copied().unwrap_or(Color::White) == Color::White {
                self.visit(id, &mut colors)?;
            }
        }
        Ok(())
    }

    fn visit<'a>(&'a self, node: &'a str, colors: &mut HashMap<&'a str, Color>) -> Result<()> {
        colors.insert(node, Color::Gray);
        if let Some(targets) = self.dependents.get(node) {
            for target in targets {
                match colors.get(target.as_str()).copied().unwrap_or(Color::White) {
                    Color::Gray => {
                        return Err(TaskweaveError::CycleDetected {
                            from: node.to_string(),
                            to: target.clone(),
                        })
                    }
                    Color::White => self.visit(target, colors)?,
                    Color::Black => {}
                }
            }
        }
        colors.insert(node, Color::Black);
        Ok(())
    }

    /// Partition agents into execution layers: layer 0 holds all source
    /// agents, layer k+1 the agents whose dependencies are all placed in
    /// layers ≤ k. Within a layer, declaration order is preserved.
    pub fn layers(&self) -> Vec<Vec<String>> {
        let mut placed: HashSet<String> = HashSet::with_capacity(self.order.len());
        let mut layers = Vec::new();

        while placed.len() < self.order.len() {
            let mut layer = Vec::new();
            for id in &self.order {
                if placed.contains(id) {
                    continue;
                }
                if self.dependencies[id].iter().all(|dep| placed.contains(dep)) {
                    layer.push(id.clone());
                }
            }
            // Construction already rejected cycles, so every round
            // places at least one agent.
            if layer.is_empty() {
                break;
            }
            placed.extend(layer.iter().cloned());
            layers.push(layer);
        }

        layers
    }

    /// Direct dependencies of an agent, deduplicated, declaration order.
    pub fn dependencies(&self, agent_id: &str) -> &[String] {
        self.dependencies
            .get(agent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether all of an agent's dependencies are in `completed`.
    pub fn is_ready(&self, agent_id: &str, completed: &HashSet<String>) -> bool {
        self.dependencies(agent_id)
            .iter()
            .all(|dep| completed.contains(dep))
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentSpec> {
        self.specs.get(agent_id)
    }

    pub fn agent_ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
