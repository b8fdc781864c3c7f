//! stratus.toml configuration parser.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StratusConfig {
    pub master: MasterConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    /// Advertised host of this master.
    pub host: String,
    /// gRPC port the status service listens on.
    pub port: u16,
    /// Fixed cluster id; generated at startup when absent.
    pub cluster_id: Option<String>,
    /// Names of extension modules loaded on the master.
    pub coprocessors: Vec<String>,
    /// Maximum number of dead servers remembered.
    pub dead_history_capacity: usize,
    /// Initial balancer switch. Unset means unknown until first toggled.
    pub balancer_on: Option<bool>,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 16000,
            cluster_id: None,
            coprocessors: Vec::new(),
            dead_history_capacity: 100,
            balancer_on: Some(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Master endpoint, e.g. `http://127.0.0.1:16000`.
    pub endpoint: String,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:16000".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl StratusConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: StratusConfig = toml::from_str(content)?;
        if config.master.dead_history_capacity == 0 {
            anyhow::bail!("master.dead_history_capacity must be at least 1");
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
