//! Agent registry and tool-backed agents.

pub mod agent;
pub mod builtin;
pub mod registry;

pub use agent::{ParamShaper, ToolAgent};
pub use registry::{AgentFactory, AgentRegistry};
