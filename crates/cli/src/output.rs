//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use usage_lib::{ContainerRecord, NodeRecord, PodRecord, ResourcePair};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Render items as a rounded table
pub fn table<T: Tabled>(items: &[T]) -> String {
    Table::new(items).with(Style::rounded()).to_string()
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Color a utilization percentage by how close it is to saturation
pub fn color_percent(percent: f64) -> String {
    let formatted = format_percent(percent);
    if percent >= 90.0 {
        formatted.red().to_string()
    } else if percent >= 70.0 {
        formatted.yellow().to_string()
    } else {
        formatted.green().to_string()
    }
}

pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

fn pair_cpu(pair: &Option<ResourcePair>) -> String {
    pair.as_ref()
        .map(|p| p.cpu.clone())
        .filter(|cpu| !cpu.is_empty())
        .unwrap_or_else(|| "-".to_string())
}

fn pair_memory(pair: &Option<ResourcePair>) -> String {
    pair.as_ref()
        .map(|p| p.memory.clone())
        .filter(|memory| !memory.is_empty())
        .unwrap_or_else(|| "-".to_string())
}

fn optional_percent(percent: Option<f64>) -> String {
    percent.map(format_percent).unwrap_or_else(|| "-".to_string())
}

/// Row for node tables
#[derive(Tabled)]
pub struct NodeRow {
    #[tabled(rename = "Node")]
    name: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "CPU %")]
    cpu_percent: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Memory %")]
    memory_percent: String,
    #[tabled(rename = "Allocatable CPU")]
    allocatable_cpu: String,
    #[tabled(rename = "Allocatable Memory")]
    allocatable_memory: String,
}

impl From<&NodeRecord> for NodeRow {
    fn from(node: &NodeRecord) -> Self {
        Self {
            name: node.name.clone(),
            cpu: node.usage.cpu.clone(),
            cpu_percent: format_percent(node.cpu_percent),
            memory: node.usage.memory.clone(),
            memory_percent: format_percent(node.memory_percent),
            allocatable_cpu: pair_cpu(&node.allocatable),
            allocatable_memory: pair_memory(&node.allocatable),
        }
    }
}

/// Row for pod tables
#[derive(Tabled)]
pub struct PodRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Pod")]
    name: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "CPU Req/Limit")]
    cpu_bounds: String,
    #[tabled(rename = "Memory Req/Limit")]
    memory_bounds: String,
}

impl From<&PodRecord> for PodRow {
    fn from(pod: &PodRecord) -> Self {
        Self {
            namespace: pod.namespace.clone(),
            name: pod.name.clone(),
            cpu: pod.usage.cpu.clone(),
            memory: pod.usage.memory.clone(),
            cpu_bounds: format!("{}/{}", pair_cpu(&pod.requests), pair_cpu(&pod.limits)),
            memory_bounds: format!(
                "{}/{}",
                pair_memory(&pod.requests),
                pair_memory(&pod.limits)
            ),
        }
    }
}

/// Row for container tables
#[derive(Tabled)]
pub struct ContainerRow {
    #[tabled(rename = "Container")]
    name: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "CPU % of Limit")]
    cpu_percent: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Memory % of Limit")]
    memory_percent: String,
    #[tabled(rename = "CPU Req/Limit")]
    cpu_bounds: String,
    #[tabled(rename = "Memory Req/Limit")]
    memory_bounds: String,
}

impl From<&ContainerRecord> for ContainerRow {
    fn from(container: &ContainerRecord) -> Self {
        Self {
            name: container.name.clone(),
            cpu: container.usage.cpu.clone(),
            cpu_percent: optional_percent(container.cpu_percent_of_limit),
            memory: container.usage.memory.clone(),
            memory_percent: optional_percent(container.memory_percent_of_limit),
            cpu_bounds: format!(
                "{}/{}",
                pair_cpu(&container.requests),
                pair_cpu(&container.limits)
            ),
            memory_bounds: format!(
                "{}/{}",
                pair_memory(&container.requests),
                pair_memory(&container.limits)
            ),
        }
    }
}
