//! Cluster data sources
//!
//! The aggregator never talks to a cluster directly. It goes through
//! [`ClusterDataSource`], which returns raw `kubectl top` tables and raw
//! YAML descriptors. [`KubectlSource`] is the implementation backed by the
//! `kubectl` binary.

mod kubectl;

#[cfg(test)]
pub(crate) mod fixture;

pub use kubectl::{KubectlConfig, KubectlSource};

use crate::error::Result;

pub use async_trait::async_trait;

/// Capability for fetching usage tables and resource descriptors
#[async_trait]
pub trait ClusterDataSource: Send + Sync {
    /// Identifier stamped on aggregates built from this source
    fn source_id(&self) -> &str;

    /// Run a cluster-wide resource-usage query (`kubectl top <args>`)
    async fn run(&self, args: &[&str]) -> Result<String>;

    /// Run a resource-usage query scoped to one namespace
    async fn run_scoped(&self, namespace: &str, args: &[&str]) -> Result<String>;

    /// Fetch a structured listing (`kubectl get <args> -o yaml`)
    async fn fetch_descriptor(&self, args: &[&str]) -> Result<Vec<u8>>;

    /// Fetch one resource's full structured descriptor
    async fn fetch_resource_descriptor(
        &self,
        kind: &str,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Vec<u8>>;
}
