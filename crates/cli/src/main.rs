//! kusage - Kubernetes resource usage from the command line
//!
//! Answers free-text questions ("which pods use the most memory in
//! namespace shop") and explicit `top` queries about cluster, node,
//! namespace, pod and container usage, using `kubectl top`.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use commands::{query, top};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use usage_lib::{KubectlConfig, KubectlSource, QueryRouter, Scope, SortKey};

/// Kubernetes resource usage CLI
#[derive(Parser)]
#[command(name = "kusage")]
#[command(author, version, about = "Kubernetes resource usage queries", long_about = None)]
pub struct Cli {
    /// Path to kubeconfig file (uses kubectl's default if not specified)
    #[arg(long, env = "KUBECONFIG", global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// kubeconfig context to use
    #[arg(long, env = "KUSAGE_CONTEXT", global = true)]
    pub context: Option<String>,

    /// kubectl binary to run
    #[arg(long, global = true)]
    pub kubectl: Option<String>,

    /// Timeout for each kubectl call, in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a free-text usage question
    Query {
        /// The question, e.g. "top pods by memory in namespace shop"
        text: String,

        #[command(flatten)]
        options: QueryArgs,
    },

    /// Show usage for one scope
    #[command(subcommand)]
    Top(TopCommands),
}

/// Explicit options that override what the question text implies
#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    /// Scope to query (cluster, node, namespace, pod, container)
    #[arg(long)]
    pub scope: Option<Scope>,

    /// Node name
    #[arg(long)]
    pub node: Option<String>,

    /// Pod name
    #[arg(long)]
    pub pod: Option<String>,

    /// Container name
    #[arg(long)]
    pub container: Option<String>,

    /// Namespace
    #[arg(long, short)]
    pub namespace: Option<String>,

    /// Query pods across all namespaces
    #[arg(long, short = 'A')]
    pub all_namespaces: bool,

    /// Sort lists by this resource, highest first
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Show at most this many entries
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum TopCommands {
    /// Cluster totals and per-node usage
    Cluster {
        #[arg(long)]
        sort: Option<SortKey>,
    },

    /// Node usage, or a single node
    Nodes {
        /// Node name (exact or partial)
        name: Option<String>,

        #[arg(long)]
        sort: Option<SortKey>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Summed pod usage for a namespace
    Namespace {
        /// Namespace name
        name: Option<String>,

        #[arg(long)]
        sort: Option<SortKey>,
    },

    /// Pod usage, or a single pod with its containers
    Pods {
        /// Pod name
        name: Option<String>,

        #[arg(long, short)]
        namespace: Option<String>,

        #[arg(long, short = 'A')]
        all_namespaces: bool,

        #[arg(long)]
        sort: Option<SortKey>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Container usage within one pod
    Containers {
        /// Pod name
        pod: String,

        /// Container name (exact or partial)
        #[arg(long, short)]
        container: Option<String>,

        #[arg(long, short)]
        namespace: Option<String>,

        #[arg(long)]
        sort: Option<SortKey>,

        #[arg(long)]
        limit: Option<usize>,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if !verbose {
        return;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::Config::load()?;

    let format = match cli.format {
        Some(format) => format,
        None => match config.default_format.as_deref() {
            Some(name) => output::OutputFormat::from_str(name, true)
                .map_err(|e| anyhow::anyhow!("Invalid default_format in config: {}", e))?,
            None => output::OutputFormat::default(),
        },
    };

    let defaults = KubectlConfig::default();
    let kubectl = KubectlConfig {
        binary: cli
            .kubectl
            .or(config.kubectl.clone())
            .map(PathBuf::from)
            .unwrap_or(defaults.binary),
        kubeconfig: cli.kubeconfig,
        context: cli.context,
        timeout: cli
            .timeout
            .or(config.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout),
    };

    let router = QueryRouter::new(Arc::new(KubectlSource::new(kubectl)));
    let ctx = query::QueryContext::new(router, format, config.default_namespace);

    let succeeded = match cli.command {
        Commands::Query { text, options } => query::run(&ctx, &text, options.into()).await?,
        Commands::Top(top_cmd) => query::run(&ctx, "", top::options(top_cmd)).await?,
    };

    if !succeeded {
        std::process::exit(1);
    }

    Ok(())
}
