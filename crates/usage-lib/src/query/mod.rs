//! Free-text usage queries
//!
//! A query string is classified into a [`QueryIntent`], merged with the
//! caller's explicit [`QueryOptions`] (explicit values always win) and routed
//! to one aggregator operation. Every query ends in exactly one
//! [`ResultEnvelope`].

mod classifier;
mod envelope;
mod router;

pub use classifier::classify;
pub use envelope::{ErrorDetail, Payload, ResultEnvelope};
pub use router::QueryRouter;

use crate::error::UsageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregation level a query targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Cluster,
    Node,
    Namespace,
    Pod,
    Container,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Cluster => "cluster",
            Scope::Node => "node",
            Scope::Namespace => "namespace",
            Scope::Pod => "pod",
            Scope::Container => "container",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cluster" => Ok(Scope::Cluster),
            "node" | "nodes" => Ok(Scope::Node),
            "namespace" | "ns" => Ok(Scope::Namespace),
            "pod" | "pods" => Ok(Scope::Pod),
            "container" | "containers" => Ok(Scope::Container),
            other => Err(UsageError::InvalidRequest(format!("unknown scope {:?}", other))),
        }
    }
}

/// Usage dimension lists are ordered by, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Cpu,
    Memory,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Cpu => "cpu",
            SortKey::Memory => "memory",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cpu" => Ok(SortKey::Cpu),
            "memory" | "mem" => Ok(SortKey::Memory),
            other => Err(UsageError::InvalidRequest(format!("unknown sort key {:?}", other))),
        }
    }
}

/// What a free-text query asks for. Empty fields mean "not mentioned".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub scope: Scope,
    /// Node, pod or container name, depending on `scope`
    pub target: Option<String>,
    /// Pod named alongside a container-scope query
    pub pod: Option<String>,
    pub namespace: Option<String>,
    pub sort: Option<SortKey>,
}

/// Options supplied explicitly by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    pub scope: Option<Scope>,
    pub node: Option<String>,
    pub pod: Option<String>,
    pub container: Option<String>,
    pub namespace: Option<String>,
    pub all_namespaces: bool,
    pub sort: Option<SortKey>,
    /// Keep only the first N entries of a sorted list
    pub limit: Option<usize>,
}

impl QueryOptions {
    /// Fill unset options from a classified intent.
    ///
    /// The intent's target only applies when its scope is the resolved
    /// scope, so an explicit `scope: pod` never picks up a node name.
    pub fn merge_intent(mut self, intent: &QueryIntent) -> Self {
        let scope = *self.scope.get_or_insert(intent.scope);

        if scope == intent.scope {
            let slot = match scope {
                Scope::Node => Some(&mut self.node),
                Scope::Pod => Some(&mut self.pod),
                Scope::Container => Some(&mut self.container),
                Scope::Cluster | Scope::Namespace => None,
            };
            if let (Some(slot), Some(target)) = (slot, &intent.target) {
                slot.get_or_insert_with(|| target.clone());
            }
            if scope == Scope::Container {
                if let Some(pod) = &intent.pod {
                    self.pod.get_or_insert_with(|| pod.clone());
                }
            }
        }

        if let Some(namespace) = &intent.namespace {
            self.namespace.get_or_insert_with(|| namespace.clone());
        }
        if self.sort.is_none() {
            self.sort = intent.sort;
        }
        self
    }
}
