use anyhow::{Context, Result};
use nodeflow_core::BuilderConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime settings, usually read from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub builder: BuilderConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Per-node time limit; unlimited when absent
    #[serde(default)]
    pub node_timeout_secs: Option<u64>,

    /// Render every input value as a string before invoking a node
    #[serde(default = "default_stringify_inputs")]
    pub stringify_inputs: bool,
}

fn default_stringify_inputs() -> bool {
    false
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            node_timeout_secs: None,
            stringify_inputs: default_stringify_inputs(),
        }
    }
}

impl RuntimeConfig {
    /// Load from `config_path`, falling back to defaults when the file is missing
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::info!(
                "Configuration file {} not found, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read configuration file {}", config_path.display()))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration file")
    }
}
