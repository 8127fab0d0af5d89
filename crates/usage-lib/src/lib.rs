//! Usage library for Kubernetes resource telemetry
//!
//! This crate provides the core functionality for:
//! - Unit normalization of CPU and memory quantities
//! - Parsing `kubectl top` tables and node/pod descriptors
//! - Aggregating usage at cluster, node, namespace, pod and container scope
//! - Classifying free-text operator queries and routing them
//! - Observability for the query pipeline

pub mod aggregator;
pub mod error;
pub mod models;
pub mod observability;
pub mod parser;
pub mod query;
pub mod source;
pub mod units;

pub use aggregator::MetricsAggregator;
pub use error::{Result, UsageError};
pub use models::*;
pub use observability::{QueryLogger, UsageMetrics};
pub use query::{
    classify, ErrorDetail, Payload, QueryIntent, QueryOptions, QueryRouter, ResultEnvelope, Scope,
    SortKey,
};
pub use source::{ClusterDataSource, KubectlConfig, KubectlSource};
