//! `kubectl`-backed data source
//!
//! Each call spawns one `kubectl` process. The child is killed when the
//! returned future is dropped, so cancelling a query also stops the
//! in-flight command.

use super::ClusterDataSource;
use crate::error::{Result, UsageError};
use crate::observability::UsageMetrics;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Configuration for invoking kubectl
#[derive(Debug, Clone)]
pub struct KubectlConfig {
    /// kubectl binary name or path (default: "kubectl")
    pub binary: PathBuf,
    /// Explicit kubeconfig file, otherwise kubectl's own resolution applies
    pub kubeconfig: Option<PathBuf>,
    /// Context to use instead of the current one
    pub context: Option<String>,
    /// Per-command timeout (default: 30 seconds)
    pub timeout: Duration,
}

impl Default for KubectlConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("kubectl"),
            kubeconfig: None,
            context: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Data source that shells out to kubectl
pub struct KubectlSource {
    config: KubectlConfig,
    metrics: UsageMetrics,
}

impl KubectlSource {
    pub fn new(config: KubectlConfig) -> Self {
        Self {
            config,
            metrics: UsageMetrics::new(),
        }
    }

    pub fn config(&self) -> &KubectlConfig {
        &self.config
    }

    /// Build the full argument list, global flags first
    fn command_args(&self, args: &[&str]) -> Vec<String> {
        let mut full = Vec::with_capacity(args.len() + 4);
        if let Some(kubeconfig) = &self.config.kubeconfig {
            full.push("--kubeconfig".to_string());
            full.push(kubeconfig.display().to_string());
        }
        if let Some(context) = &self.config.context {
            full.push("--context".to_string());
            full.push(context.clone());
        }
        full.extend(args.iter().map(|arg| arg.to_string()));
        full
    }

    async fn execute(&self, args: &[&str]) -> Result<Vec<u8>> {
        let full = self.command_args(args);
        let command = format!("kubectl {}", args.join(" "));
        debug!(command = %command, "Running kubectl");

        let started = Instant::now();
        let output = Command::new(&self.config.binary)
            .args(&full)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.config.timeout, output)
            .await
            .map_err(|_| UsageError::Timeout {
                command: command.clone(),
                seconds: self.config.timeout.as_secs(),
            })?
            .map_err(|e| UsageError::fetch(&command, e.to_string()))?;
        self.metrics
            .observe_fetch_latency(started.elapsed().as_secs_f64());

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                text => text.to_string(),
            };
            return Err(UsageError::fetch(command, message));
        }

        Ok(output.stdout)
    }

    async fn execute_text(&self, args: &[&str]) -> Result<String> {
        let stdout = self.execute(args).await?;
        String::from_utf8(stdout).map_err(|e| {
            UsageError::fetch(format!("kubectl {}", args.join(" ")), e.to_string())
        })
    }
}

#[async_trait]
impl ClusterDataSource for KubectlSource {
    fn source_id(&self) -> &str {
        "kubectl-top"
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let mut full = vec!["top"];
        full.extend_from_slice(args);
        self.execute_text(&full).await
    }

    async fn run_scoped(&self, namespace: &str, args: &[&str]) -> Result<String> {
        let mut full = vec!["top"];
        full.extend_from_slice(args);
        full.extend_from_slice(&["--namespace", namespace]);
        self.execute_text(&full).await
    }

    async fn fetch_descriptor(&self, args: &[&str]) -> Result<Vec<u8>> {
        let mut full = vec!["get"];
        full.extend_from_slice(args);
        full.extend_from_slice(&["-o", "yaml"]);
        self.execute(&full).await
    }

    async fn fetch_resource_descriptor(
        &self,
        kind: &str,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Vec<u8>> {
        let mut full = vec!["get", kind, name];
        if let Some(namespace) = namespace {
            full.extend_from_slice(&["--namespace", namespace]);
        }
        full.extend_from_slice(&["-o", "yaml"]);
        self.execute(&full).await
    }
}
