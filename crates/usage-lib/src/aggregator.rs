//! Usage aggregation over a cluster data source
//!
//! Each operation performs one primary fetch whose failure fails the
//! operation, followed by optional enrichment lookups (node allocatable,
//! per-container usage, requests/limits) that go through
//! [`MetricsAggregator::best_effort`] and never fail it.

use crate::error::{Result, UsageError};
use crate::models::{
    ClusterAggregate, ClusterTotals, ContainerRecord, NamespaceAggregate, NodeRecord, PodRecord,
    DEFAULT_NAMESPACE,
};
use crate::observability::{QueryLogger, UsageMetrics};
use crate::parser;
use crate::source::ClusterDataSource;
use crate::units::percent_of;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// kubectl reports a missing pod as a failed command with a `(NotFound)`
/// server error; surface that as a not-found error instead
fn missing_as_not_found(err: UsageError, name: &str, namespace: &str) -> UsageError {
    if let UsageError::Fetch { message, .. } = &err {
        if message.contains("(NotFound)") {
            return UsageError::not_found("pod", name, Some(namespace));
        }
    }
    err
}

fn namespace_or_default(namespace: &str) -> &str {
    if namespace.is_empty() {
        DEFAULT_NAMESPACE
    } else {
        namespace
    }
}

/// Builds usage records and aggregates from a [`ClusterDataSource`]
#[derive(Clone)]
pub struct MetricsAggregator {
    source: Arc<dyn ClusterDataSource>,
    metrics: UsageMetrics,
    logger: QueryLogger,
}

impl MetricsAggregator {
    pub fn new(source: Arc<dyn ClusterDataSource>) -> Self {
        let logger = QueryLogger::new(source.source_id());
        Self {
            source,
            metrics: UsageMetrics::new(),
            logger,
        }
    }

    pub fn source_id(&self) -> &str {
        self.source.source_id()
    }

    /// Run an enrichment lookup fail-open.
    ///
    /// Any failure is logged and turned into `Ok(None)`, except cancellation,
    /// which still aborts the whole operation.
    async fn best_effort<T, F>(&self, what: &str, lookup: F) -> Result<Option<T>>
    where
        F: Future<Output = Result<T>>,
    {
        match lookup.await {
            Ok(value) => Ok(Some(value)),
            Err(UsageError::Cancelled) => Err(UsageError::Cancelled),
            Err(e) => {
                self.metrics.inc_enrichment_failures();
                self.logger.log_enrichment_skipped(what, &e.to_string());
                Ok(None)
            }
        }
    }

    /// Every node's usage, with allocatable and capacity when available
    pub async fn node_metrics(&self) -> Result<Vec<NodeRecord>> {
        let text = self.source.run(&["node", "--no-headers"]).await?;
        let mut nodes = parser::parse_node_rows(&text);
        debug!(nodes = nodes.len(), "Parsed node usage rows");

        if nodes.is_empty() {
            return Ok(nodes);
        }

        let descriptor = self
            .best_effort(
                "node allocatable",
                self.source.fetch_descriptor(&["nodes"]),
            )
            .await?;

        if let Some(document) = descriptor {
            let resources = parser::parse_node_resources(&String::from_utf8_lossy(&document));
            for node in &mut nodes {
                if let Some(found) = resources.iter().find(|r| r.name == node.name) {
                    node.allocatable = Some(found.allocatable.clone());
                    node.capacity = Some(found.capacity.clone());
                }
            }
        }

        Ok(nodes)
    }

    /// Cluster totals summed over all nodes.
    ///
    /// Percentages come from the summed usage and allocatable, not from the
    /// per-node percentages.
    pub async fn cluster_metrics(&self) -> Result<ClusterAggregate> {
        let nodes = self.node_metrics().await?;

        let mut totals = nodes.iter().fold(ClusterTotals::default(), |mut totals, node| {
            totals.used_cpu_millicores = totals
                .used_cpu_millicores
                .saturating_add(node.usage.cpu_millicores());
            totals.used_memory_bytes = totals
                .used_memory_bytes
                .saturating_add(node.usage.memory_bytes());
            if let Some(allocatable) = &node.allocatable {
                totals.total_cpu_millicores = totals
                    .total_cpu_millicores
                    .saturating_add(allocatable.cpu_millicores());
                totals.total_memory_bytes = totals
                    .total_memory_bytes
                    .saturating_add(allocatable.memory_bytes());
            }
            totals
        });
        totals.cpu_percent = percent_of(totals.used_cpu_millicores, totals.total_cpu_millicores);
        totals.memory_percent = percent_of(totals.used_memory_bytes, totals.total_memory_bytes);

        Ok(ClusterAggregate {
            timestamp: chrono::Utc::now(),
            source: self.source_id().to_string(),
            node_count: nodes.len(),
            ready_node_count: nodes.len(),
            nodes,
            totals,
        })
    }

    /// Summed pod usage for one namespace
    pub async fn namespace_metrics(&self, namespace: &str) -> Result<NamespaceAggregate> {
        let namespace = namespace_or_default(namespace);
        let text = self
            .source
            .run_scoped(namespace, &["pod", "--no-headers"])
            .await?;
        let pods = parser::parse_pod_rows(&text, namespace);
        debug!(namespace = %namespace, pods = pods.len(), "Parsed pod usage rows");

        let total_cpu_millicores = pods
            .iter()
            .fold(0u64, |sum, p| sum.saturating_add(p.usage.cpu_millicores()));
        let total_memory_bytes = pods
            .iter()
            .fold(0u64, |sum, p| sum.saturating_add(p.usage.memory_bytes()));

        Ok(NamespaceAggregate {
            namespace: namespace.to_string(),
            source: self.source_id().to_string(),
            pod_count: pods.len(),
            pods,
            total_cpu_millicores,
            total_memory_bytes,
        })
    }

    /// One pod with its containers and requests/limits when available
    pub async fn pod_metrics(&self, name: &str, namespace: &str) -> Result<PodRecord> {
        let namespace = namespace_or_default(namespace);
        let text = self
            .source
            .run_scoped(namespace, &["pod", name, "--no-headers"])
            .await
            .map_err(|e| missing_as_not_found(e, name, namespace))?;
        let mut pod = parser::parse_pod_rows(&text, namespace)
            .into_iter()
            .next()
            .ok_or_else(|| UsageError::not_found("pod", name, Some(namespace)))?;

        if let Some(containers) = self
            .best_effort("container usage", self.fetch_containers(name, namespace))
            .await?
        {
            pod.containers = containers;
        }

        if let Some(document) = self
            .best_effort(
                "pod requests/limits",
                self.source
                    .fetch_resource_descriptor("pod", name, Some(namespace)),
            )
            .await?
        {
            let document = String::from_utf8_lossy(&document);
            let resources = parser::parse_requests_limits(&document, None);
            pod.requests = resources.requests;
            pod.limits = resources.limits;
            apply_container_resources(&document, &mut pod.containers);
        }

        Ok(pod)
    }

    /// Usage for every pod in a namespace, or in the whole cluster
    pub async fn all_pod_metrics(
        &self,
        namespace: &str,
        all_namespaces: bool,
    ) -> Result<Vec<PodRecord>> {
        let pods = if all_namespaces {
            let text = self
                .source
                .run(&["pod", "--all-namespaces", "--no-headers"])
                .await?;
            parser::parse_pod_rows(&text, DEFAULT_NAMESPACE)
        } else {
            let namespace = namespace_or_default(namespace);
            let text = self
                .source
                .run_scoped(namespace, &["pod", "--no-headers"])
                .await?;
            parser::parse_pod_rows(&text, namespace)
        };
        debug!(pods = pods.len(), all_namespaces, "Parsed pod usage rows");

        Ok(pods)
    }

    /// Per-container usage for one pod, with requests/limits when available
    pub async fn container_metrics(
        &self,
        pod: &str,
        namespace: &str,
    ) -> Result<Vec<ContainerRecord>> {
        let namespace = namespace_or_default(namespace);
        let mut containers = self
            .fetch_containers(pod, namespace)
            .await
            .map_err(|e| missing_as_not_found(e, pod, namespace))?;

        if containers.is_empty() {
            return Ok(containers);
        }

        if let Some(document) = self
            .best_effort(
                "container requests/limits",
                self.source
                    .fetch_resource_descriptor("pod", pod, Some(namespace)),
            )
            .await?
        {
            apply_container_resources(&String::from_utf8_lossy(&document), &mut containers);
        }

        Ok(containers)
    }

    async fn fetch_containers(&self, pod: &str, namespace: &str) -> Result<Vec<ContainerRecord>> {
        let text = self
            .source
            .run_scoped(namespace, &["pod", pod, "--containers", "--no-headers"])
            .await?;
        let containers = parser::parse_container_rows(&text);
        debug!(pod = %pod, containers = containers.len(), "Parsed container usage rows");
        Ok(containers)
    }
}

fn apply_container_resources(document: &str, containers: &mut [ContainerRecord]) {
    for container in containers {
        let resources = parser::parse_requests_limits(document, Some(&container.name));
        container.apply_requests_limits(resources);
    }
}
