//! Routing of classified queries to aggregator operations

use super::{classify, Payload, QueryOptions, ResultEnvelope, Scope, SortKey};
use crate::aggregator::MetricsAggregator;
use crate::error::{Result, UsageError};
use crate::models::{ContainerRecord, NodeRecord, PodRecord};
use crate::observability::{QueryLogger, UsageMetrics};
use crate::source::ClusterDataSource;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Answers usage queries against one data source
#[derive(Clone)]
pub struct QueryRouter {
    aggregator: MetricsAggregator,
    metrics: UsageMetrics,
    logger: QueryLogger,
}

impl QueryRouter {
    pub fn new(source: Arc<dyn ClusterDataSource>) -> Self {
        let logger = QueryLogger::new(source.source_id());
        Self {
            aggregator: MetricsAggregator::new(source),
            metrics: UsageMetrics::new(),
            logger,
        }
    }

    pub fn aggregator(&self) -> &MetricsAggregator {
        &self.aggregator
    }

    /// Classify `query`, merge it with `options` and answer it
    pub async fn handle(&self, query: &str, options: QueryOptions) -> ResultEnvelope {
        let started = Instant::now();
        let intent = classify(query);
        self.logger.log_classified(
            query,
            intent.scope.as_str(),
            intent.target.as_deref(),
            intent.namespace.as_deref(),
            intent.sort.map(|s| s.as_str()),
        );

        let options = options.merge_intent(&intent);
        let scope = options.scope.unwrap_or_default();
        self.metrics.inc_queries(scope.as_str());

        let envelope = match self.dispatch(scope, &options).await {
            Ok(payload) => {
                self.logger.log_completed(
                    scope.as_str(),
                    payload.item_count(),
                    started.elapsed().as_secs_f64() * 1000.0,
                );
                ResultEnvelope::result(payload)
            }
            Err(e) => self.failure(scope, &e),
        };

        self.metrics
            .observe_query_latency(started.elapsed().as_secs_f64());
        envelope
    }

    /// Like [`handle`](Self::handle), but gives up as soon as `cancel`
    /// completes. The in-flight fetch is dropped and no partial result is
    /// returned.
    pub async fn handle_with_cancel<C>(
        &self,
        query: &str,
        options: QueryOptions,
        cancel: C,
    ) -> ResultEnvelope
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            envelope = self.handle(query, options) => envelope,
            _ = cancel => self.failure(Scope::default(), &UsageError::Cancelled),
        }
    }

    fn failure(&self, scope: Scope, err: &UsageError) -> ResultEnvelope {
        self.metrics.inc_query_errors(err.code());
        self.logger
            .log_failed(scope.as_str(), err.code(), &err.to_string());
        let message = match err {
            UsageError::Cancelled => "Query cancelled".to_string(),
            _ => format!("Failed to get {} metrics: {}", scope, err),
        };
        ResultEnvelope::error(message, err)
    }

    async fn dispatch(&self, scope: Scope, options: &QueryOptions) -> Result<Payload> {
        let namespace = options.namespace.as_deref().unwrap_or_default();

        match scope {
            Scope::Cluster => {
                let mut cluster = self.aggregator.cluster_metrics().await?;
                if let Some(key) = options.sort {
                    sort_nodes(&mut cluster.nodes, key);
                }
                Ok(Payload::Cluster(cluster))
            }
            Scope::Node => {
                let mut nodes = self.aggregator.node_metrics().await?;
                if let Some(name) = &options.node {
                    return find_by_name(nodes, name, |n| &n.name)
                        .map(Payload::Node)
                        .ok_or_else(|| UsageError::not_found("node", name, None));
                }
                if let Some(key) = options.sort {
                    sort_nodes(&mut nodes, key);
                }
                Ok(Payload::Nodes(limit(nodes, options.limit)))
            }
            Scope::Namespace => {
                let mut aggregate = self.aggregator.namespace_metrics(namespace).await?;
                if let Some(key) = options.sort {
                    sort_pods(&mut aggregate.pods, key);
                }
                // Totals and pod_count keep covering the whole namespace
                aggregate.pods = limit(aggregate.pods, options.limit);
                Ok(Payload::Namespace(aggregate))
            }
            Scope::Pod => {
                if let Some(name) = &options.pod {
                    let pod = self.aggregator.pod_metrics(name, namespace).await?;
                    return Ok(Payload::Pod(pod));
                }
                let mut pods = self
                    .aggregator
                    .all_pod_metrics(namespace, options.all_namespaces)
                    .await?;
                if let Some(key) = options.sort {
                    sort_pods(&mut pods, key);
                }
                Ok(Payload::Pods(limit(pods, options.limit)))
            }
            Scope::Container => {
                let pod = options.pod.as_deref().ok_or_else(|| {
                    UsageError::InvalidRequest("container queries need a pod name".to_string())
                })?;
                let mut containers = self.aggregator.container_metrics(pod, namespace).await?;
                if let Some(name) = &options.container {
                    let namespace = options.namespace.as_deref();
                    return find_by_name(containers, name, |c| &c.name)
                        .map(Payload::Container)
                        .ok_or_else(|| UsageError::not_found("container", name, namespace));
                }
                if let Some(key) = options.sort {
                    sort_containers(&mut containers, key);
                }
                Ok(Payload::Containers(limit(containers, options.limit)))
            }
        }
    }
}

/// Exact name match first, then the first name containing `target`
fn find_by_name<T>(items: Vec<T>, target: &str, name: impl Fn(&T) -> &str) -> Option<T> {
    let index = items
        .iter()
        .position(|item| name(item) == target)
        .or_else(|| items.iter().position(|item| name(item).contains(target)))?;
    items.into_iter().nth(index)
}

fn limit<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(n) = limit {
        items.truncate(n);
    }
    items
}

// All sorts are stable and descending: highest usage first, ties keep
// their original order.

fn sort_nodes(nodes: &mut [NodeRecord], key: SortKey) {
    match key {
        SortKey::Cpu => nodes.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent)),
        SortKey::Memory => nodes.sort_by(|a, b| b.memory_percent.total_cmp(&a.memory_percent)),
    }
}

fn sort_pods(pods: &mut [PodRecord], key: SortKey) {
    match key {
        SortKey::Cpu => pods.sort_by(|a, b| b.usage.cpu_millicores().cmp(&a.usage.cpu_millicores())),
        SortKey::Memory => {
            pods.sort_by(|a, b| b.usage.memory_bytes().cmp(&a.usage.memory_bytes()))
        }
    }
}

fn sort_containers(containers: &mut [ContainerRecord], key: SortKey) {
    match key {
        SortKey::Cpu => {
            containers.sort_by(|a, b| b.usage.cpu_millicores().cmp(&a.usage.cpu_millicores()))
        }
        SortKey::Memory => {
            containers.sort_by(|a, b| b.usage.memory_bytes().cmp(&a.usage.memory_bytes()))
        }
    }
}
