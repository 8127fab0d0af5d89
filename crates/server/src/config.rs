//! Server configuration

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use usage_lib::KubectlConfig;

/// Server configuration, read from `KUSAGE_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port for the query, health and metrics API
    #[serde(default = "default_port")]
    pub port: u16,

    /// kubectl binary to run
    #[serde(default = "default_kubectl")]
    pub kubectl: String,

    #[serde(default)]
    pub kubeconfig: Option<String>,

    #[serde(default)]
    pub context: Option<String>,

    /// Per-command timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_kubectl() -> String {
    "kubectl".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            kubectl: default_kubectl(),
            kubeconfig: None,
            context: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("KUSAGE").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn kubectl_config(&self) -> KubectlConfig {
        KubectlConfig {
            binary: PathBuf::from(&self.kubectl),
            kubeconfig: self.kubeconfig.as_ref().map(PathBuf::from),
            context: self.context.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
