use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskweaveError};

/// Top-level taskweave configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Execution engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many finished workflow results to keep queryable.
    #[serde(default = "default_max_retained")]
    pub max_retained_workflows: usize,
    /// Cap on concurrently executing workflows (None = unbounded).
    #[serde(default)]
    pub max_concurrent_workflows: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retained_workflows: default_max_retained(),
            max_concurrent_workflows: None,
        }
    }
}

fn default_max_retained() -> usize {
    256
}

impl AppConfig {
    /// Load configuration from a TOML file, expanding `${ENV_VAR}`
    /// references in the raw content before parsing.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| TaskweaveError::Config(format!("config not found: {}", path.display())))?;

        let expanded = expand_env_vars(&content);

        toml::from_str(&expanded).map_err(|e| TaskweaveError::Config(e.to_string()))
    }

    /// Load the file when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                Err(_) => {
                    // Keep original if env var not set
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}
