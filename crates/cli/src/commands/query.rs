//! Running a query and rendering its envelope

use anyhow::Result;
use colored::Colorize;
use usage_lib::{
    classify, units, ClusterAggregate, NamespaceAggregate, Payload, QueryOptions, QueryRouter,
    ResultEnvelope,
};

use crate::output::{
    color_percent, print_error, print_info, print_json, print_warning, table, ContainerRow,
    NodeRow, OutputFormat, PodRow,
};
use crate::QueryArgs;

impl From<QueryArgs> for QueryOptions {
    fn from(args: QueryArgs) -> Self {
        QueryOptions {
            scope: args.scope,
            node: args.node,
            pod: args.pod,
            container: args.container,
            namespace: args.namespace,
            all_namespaces: args.all_namespaces,
            sort: args.sort,
            limit: args.limit,
        }
    }
}

/// Everything a command needs to answer a query
pub struct QueryContext {
    router: QueryRouter,
    format: OutputFormat,
    default_namespace: Option<String>,
}

impl QueryContext {
    pub fn new(router: QueryRouter, format: OutputFormat, default_namespace: Option<String>) -> Self {
        Self {
            router,
            format,
            default_namespace,
        }
    }

    /// The configured default namespace applies only when neither the
    /// options nor the question text name one
    fn with_default_namespace(&self, text: &str, mut options: QueryOptions) -> QueryOptions {
        if options.namespace.is_none()
            && !options.all_namespaces
            && classify(text).namespace.is_none()
        {
            options.namespace = self.default_namespace.clone();
        }
        options
    }
}

/// Answer one query and print it. Returns whether it produced a result.
///
/// Ctrl-C cancels the query and stops the running kubectl process.
pub async fn run(ctx: &QueryContext, text: &str, options: QueryOptions) -> Result<bool> {
    let options = ctx.with_default_namespace(text, options);
    let interrupted = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let envelope = ctx.router.handle_with_cancel(text, options, interrupted).await;
    render(&envelope, ctx.format)?;
    Ok(!envelope.is_error())
}

fn render(envelope: &ResultEnvelope, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(envelope);
    }

    match envelope {
        ResultEnvelope::Result { payload, message } => {
            if payload.item_count() == 0 {
                print_warning(message);
                return Ok(());
            }
            println!("{}", payload_text(payload));
            print_info(message);
        }
        ResultEnvelope::Error { message, error } => {
            print_error(message);
            eprintln!("  {} {}", error.code.dimmed(), error.detail);
        }
    }

    Ok(())
}

fn cluster_text(cluster: &ClusterAggregate) -> String {
    let totals = &cluster.totals;
    let mut out = format!(
        "{}\n{}\n\
         Source:                 {}\n\
         Nodes:                  {} ({} ready)\n\
         CPU:                    {} / {} ({})\n\
         Memory:                 {} / {} ({})\n\
         Collected:              {}\n\n",
        "Cluster Usage".bold(),
        "=".repeat(50),
        cluster.source.cyan(),
        cluster.node_count,
        cluster.ready_node_count,
        units::millicores_to_text(totals.used_cpu_millicores),
        units::millicores_to_text(totals.total_cpu_millicores),
        color_percent(totals.cpu_percent),
        units::bytes_to_text(totals.used_memory_bytes),
        units::bytes_to_text(totals.total_memory_bytes),
        color_percent(totals.memory_percent),
        cluster
            .timestamp
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );

    let rows: Vec<NodeRow> = cluster.nodes.iter().map(NodeRow::from).collect();
    out.push_str(&table(&rows));
    out
}

fn namespace_text(namespace: &NamespaceAggregate) -> String {
    let mut out = format!(
        "{}\n{}\n\
         Pods:                   {}\n\
         CPU:                    {}\n\
         Memory:                 {}\n\n",
        format!("Namespace {}", namespace.namespace).bold(),
        "=".repeat(50),
        namespace.pod_count,
        units::millicores_to_text(namespace.total_cpu_millicores),
        units::bytes_to_text(namespace.total_memory_bytes)
    );

    let rows: Vec<PodRow> = namespace.pods.iter().map(PodRow::from).collect();
    out.push_str(&table(&rows));
    out
}

/// Human-readable rendering of a result payload
fn payload_text(payload: &Payload) -> String {
    match payload {
        Payload::Cluster(cluster) => cluster_text(cluster),
        Payload::Namespace(namespace) => namespace_text(namespace),
        Payload::Node(node) => table(&[NodeRow::from(node)]),
        Payload::Nodes(nodes) => {
            table(&nodes.iter().map(NodeRow::from).collect::<Vec<_>>())
        }
        Payload::Pod(pod) => {
            let mut out = table(&[PodRow::from(pod)]);
            if !pod.containers.is_empty() {
                let rows: Vec<ContainerRow> = pod.containers.iter().map(ContainerRow::from).collect();
                out.push_str("\n\n");
                out.push_str(&table(&rows));
            }
            out
        }
        Payload::Pods(pods) => table(&pods.iter().map(PodRow::from).collect::<Vec<_>>()),
        Payload::Container(container) => table(&[ContainerRow::from(container)]),
        Payload::Containers(containers) => {
            table(&containers.iter().map(ContainerRow::from).collect::<Vec<_>>())
        }
    }
}
