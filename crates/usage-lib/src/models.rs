//! Core data models for the usage pipeline

use crate::units;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Namespace applied when neither the caller nor the query names one
pub const DEFAULT_NAMESPACE: &str = "default";

/// A CPU/memory pair as reported by kubectl ("250m", "256Mi")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePair {
    pub cpu: String,
    pub memory: String,
}

impl ResourcePair {
    pub fn new(cpu: impl Into<String>, memory: impl Into<String>) -> Self {
        Self {
            cpu: cpu.into(),
            memory: memory.into(),
        }
    }

    pub fn cpu_millicores(&self) -> u64 {
        units::cpu_to_millicores(&self.cpu)
    }

    pub fn memory_bytes(&self) -> u64 {
        units::memory_to_bytes(&self.memory)
    }
}

/// Usage of a single node from `kubectl top node`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub usage: ResourcePair,
    /// Percent of allocatable CPU as reported by the metrics source
    pub cpu_percent: f64,
    /// Percent of allocatable memory as reported by the metrics source
    pub memory_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocatable: Option<ResourcePair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<ResourcePair>,
}

/// Allocatable and capacity figures scraped from a node descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResources {
    pub name: String,
    pub allocatable: ResourcePair,
    pub capacity: ResourcePair,
}

/// Requests and limits scraped from a pod descriptor. Either side may be
/// partially filled when the descriptor does not set it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestsLimits {
    pub requests: Option<ResourcePair>,
    pub limits: Option<ResourcePair>,
}

/// Usage of a single container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub name: String,
    pub usage: ResourcePair,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourcePair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourcePair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_percent_of_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_percent_of_limit: Option<f64>,
}

impl ContainerRecord {
    pub fn new(name: impl Into<String>, usage: ResourcePair) -> Self {
        Self {
            name: name.into(),
            usage,
            requests: None,
            limits: None,
            cpu_percent_of_limit: None,
            memory_percent_of_limit: None,
        }
    }

    /// Attach requests/limits and derive usage as a percent of each
    /// non-zero limit
    pub fn apply_requests_limits(&mut self, resources: RequestsLimits) {
        if let Some(limits) = &resources.limits {
            let cpu_limit = limits.cpu_millicores();
            if cpu_limit > 0 {
                self.cpu_percent_of_limit =
                    Some(units::percent_of(self.usage.cpu_millicores(), cpu_limit));
            }
            let memory_limit = limits.memory_bytes();
            if memory_limit > 0 {
                self.memory_percent_of_limit =
                    Some(units::percent_of(self.usage.memory_bytes(), memory_limit));
            }
        }
        self.requests = resources.requests;
        self.limits = resources.limits;
    }
}

/// Usage of a single pod
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodRecord {
    pub name: String,
    pub namespace: String,
    pub usage: ResourcePair,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourcePair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourcePair>,
    #[serde(default)]
    pub containers: Vec<ContainerRecord>,
}

impl PodRecord {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, usage: ResourcePair) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            usage,
            requests: None,
            limits: None,
            containers: Vec::new(),
        }
    }
}

/// Summed and derived cluster totals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterTotals {
    pub total_cpu_millicores: u64,
    pub used_cpu_millicores: u64,
    pub total_memory_bytes: u64,
    pub used_memory_bytes: u64,
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

/// Cluster-wide usage built from every node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterAggregate {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub nodes: Vec<NodeRecord>,
    pub node_count: usize,
    /// Every node reporting usage is counted as ready
    pub ready_node_count: usize,
    pub totals: ClusterTotals,
}

/// Namespace usage built from its pods
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceAggregate {
    pub namespace: String,
    pub source: String,
    pub pods: Vec<PodRecord>,
    pub pod_count: usize,
    pub total_cpu_millicores: u64,
    pub total_memory_bytes: u64,
}
