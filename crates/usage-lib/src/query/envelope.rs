//! Uniform result/error envelope returned for every query

use crate::error::UsageError;
use crate::models::{ClusterAggregate, ContainerRecord, NamespaceAggregate, NodeRecord, PodRecord};
use crate::units::{bytes_to_text, millicores_to_text};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Scope-typed success payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "scope", content = "data", rename_all = "lowercase")]
pub enum Payload {
    Cluster(ClusterAggregate),
    Node(NodeRecord),
    Nodes(Vec<NodeRecord>),
    Namespace(NamespaceAggregate),
    Pod(PodRecord),
    Pods(Vec<PodRecord>),
    Container(ContainerRecord),
    Containers(Vec<ContainerRecord>),
}

impl Payload {
    /// Number of records carried
    pub fn item_count(&self) -> usize {
        match self {
            Payload::Cluster(cluster) => cluster.node_count,
            Payload::Namespace(namespace) => namespace.pod_count,
            Payload::Nodes(nodes) => nodes.len(),
            Payload::Pods(pods) => pods.len(),
            Payload::Containers(containers) => containers.len(),
            Payload::Node(_) | Payload::Pod(_) | Payload::Container(_) => 1,
        }
    }

    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        match self {
            Payload::Cluster(cluster) => {
                let totals = &cluster.totals;
                format!(
                    "Cluster: {} nodes, CPU {}/{} ({:.1}%), memory {}/{} ({:.1}%)",
                    cluster.node_count,
                    millicores_to_text(totals.used_cpu_millicores),
                    millicores_to_text(totals.total_cpu_millicores),
                    totals.cpu_percent,
                    bytes_to_text(totals.used_memory_bytes),
                    bytes_to_text(totals.total_memory_bytes),
                    totals.memory_percent,
                )
            }
            Payload::Node(node) => format!(
                "Node {}: CPU {} ({:.0}%), memory {} ({:.0}%)",
                node.name, node.usage.cpu, node.cpu_percent, node.usage.memory, node.memory_percent
            ),
            Payload::Nodes(nodes) => format!("{} nodes", nodes.len()),
            Payload::Namespace(namespace) => format!(
                "Namespace {}: {} pods using CPU {}, memory {}",
                namespace.namespace,
                namespace.pod_count,
                millicores_to_text(namespace.total_cpu_millicores),
                bytes_to_text(namespace.total_memory_bytes),
            ),
            Payload::Pod(pod) => format!(
                "Pod {}/{}: CPU {}, memory {}, {} containers",
                pod.namespace,
                pod.name,
                pod.usage.cpu,
                pod.usage.memory,
                pod.containers.len()
            ),
            Payload::Pods(pods) => {
                let namespaces: BTreeSet<&str> =
                    pods.iter().map(|p| p.namespace.as_str()).collect();
                format!("{} pods across {} namespaces", pods.len(), namespaces.len())
            }
            Payload::Container(container) => format!(
                "Container {}: CPU {}, memory {}",
                container.name, container.usage.cpu, container.usage.memory
            ),
            Payload::Containers(containers) => format!("{} containers", containers.len()),
        }
    }
}

/// Machine-readable part of an error envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub detail: String,
}

impl From<&UsageError> for ErrorDetail {
    fn from(err: &UsageError) -> Self {
        Self {
            code: err.code().to_string(),
            detail: err.to_string(),
        }
    }
}

/// Outcome of one query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultEnvelope {
    Result { payload: Payload, message: String },
    Error { message: String, error: ErrorDetail },
}

impl ResultEnvelope {
    pub fn result(payload: Payload) -> Self {
        let message = payload.summary();
        ResultEnvelope::Result { payload, message }
    }

    pub fn error(message: impl Into<String>, err: &UsageError) -> Self {
        ResultEnvelope::Error {
            message: message.into(),
            error: err.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResultEnvelope::Error { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ResultEnvelope::Result { message, .. } | ResultEnvelope::Error { message, .. } => {
                message.as_str()
            }
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            ResultEnvelope::Result { payload, .. } => Some(payload),
            ResultEnvelope::Error { .. } => None,
        }
    }

    /// Error code, for error envelopes
    pub fn error_code(&self) -> Option<&str> {
        match self {
            ResultEnvelope::Error { error, .. } => Some(error.code.as_str()),
            ResultEnvelope::Result { .. } => None,
        }
    }
}
