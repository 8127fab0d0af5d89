//! Observability infrastructure for the query pipeline
//!
//! Provides:
//! - Prometheus metrics (query latency, fetch latency, per-scope query counts,
//!   errors, skipped enrichments)
//! - Structured logging of query events with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for latency measurements (in seconds). kubectl round
/// trips dominate, so the range is wider than for in-process work.
const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<UsageMetricsInner> = OnceLock::new();

struct UsageMetricsInner {
    query_latency_seconds: Histogram,
    fetch_latency_seconds: Histogram,
    queries_total: IntCounterVec,
    query_errors_total: IntCounterVec,
    enrichment_failures_total: IntCounter,
}

impl UsageMetricsInner {
    fn new() -> Self {
        Self {
            query_latency_seconds: register_histogram!(
                "kube_usage_query_latency_seconds",
                "Time spent answering a usage query end to end",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register query_latency_seconds"),

            fetch_latency_seconds: register_histogram!(
                "kube_usage_fetch_latency_seconds",
                "Time spent waiting on a single data source call",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register fetch_latency_seconds"),

            queries_total: register_int_counter_vec!(
                "kube_usage_queries_total",
                "Number of queries answered, by resolved scope",
                &["scope"]
            )
            .expect("Failed to register queries_total"),

            query_errors_total: register_int_counter_vec!(
                "kube_usage_query_errors_total",
                "Number of queries that ended in an error envelope, by code",
                &["code"]
            )
            .expect("Failed to register query_errors_total"),

            enrichment_failures_total: register_int_counter!(
                "kube_usage_enrichment_failures_total",
                "Number of best-effort enrichment lookups that failed and were skipped"
            )
            .expect("Failed to register enrichment_failures_total"),
        }
    }
}

/// Handle to the global usage metrics.
///
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct UsageMetrics {
    _private: (),
}

impl Default for UsageMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(UsageMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &UsageMetricsInner {
        GLOBAL_METRICS.get_or_init(UsageMetricsInner::new)
    }

    pub fn observe_query_latency(&self, duration_secs: f64) {
        self.inner().query_latency_seconds.observe(duration_secs);
    }

    pub fn observe_fetch_latency(&self, duration_secs: f64) {
        self.inner().fetch_latency_seconds.observe(duration_secs);
    }

    pub fn inc_queries(&self, scope: &str) {
        self.inner().queries_total.with_label_values(&[scope]).inc();
    }

    pub fn inc_query_errors(&self, code: &str) {
        self.inner().query_errors_total.with_label_values(&[code]).inc();
    }

    pub fn inc_enrichment_failures(&self) {
        self.inner().enrichment_failures_total.inc();
    }
}

/// Structured logger for query events
#[derive(Clone)]
pub struct QueryLogger {
    source: String,
}

impl QueryLogger {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Log how a free-text query was classified
    pub fn log_classified(
        &self,
        query: &str,
        scope: &str,
        target: Option<&str>,
        namespace: Option<&str>,
        sort: Option<&str>,
    ) {
        info!(
            event = "query_classified",
            source = %self.source,
            query = %query,
            scope = %scope,
            target = ?target,
            namespace = ?namespace,
            sort = ?sort,
            "Classified usage query"
        );
    }

    /// Log a query that produced a result envelope
    pub fn log_completed(&self, scope: &str, items: usize, elapsed_ms: f64) {
        info!(
            event = "query_completed",
            source = %self.source,
            scope = %scope,
            items = items,
            elapsed_ms = elapsed_ms,
            "Usage query completed"
        );
    }

    /// Log a query that produced an error envelope
    pub fn log_failed(&self, scope: &str, code: &str, error: &str) {
        warn!(
            event = "query_failed",
            source = %self.source,
            scope = %scope,
            code = %code,
            error = %error,
            "Usage query failed"
        );
    }

    /// Log a best-effort enrichment that was skipped
    pub fn log_enrichment_skipped(&self, what: &str, error: &str) {
        warn!(
            event = "enrichment_skipped",
            source = %self.source,
            enrichment = %what,
            error = %error,
            "Enrichment lookup failed, continuing without it"
        );
    }
}
