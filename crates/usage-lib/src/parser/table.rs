//! `kubectl top` table parsing
//!
//! Rows are whitespace separated and header-less:
//! - nodes: `NAME CPU(cores) CPU% MEMORY(bytes) MEMORY%`
//! - pods: `NAME CPU MEM` or, with `--all-namespaces`, `NAMESPACE NAME CPU MEM`
//! - containers: `POD CONTAINER CPU MEM` or `NAMESPACE POD CONTAINER CPU MEM`

use crate::models::{ContainerRecord, NodeRecord, PodRecord, ResourcePair};
use crate::units::percent_from_text;

fn rows(text: &str) -> impl Iterator<Item = Vec<&str>> {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|fields| !fields.is_empty())
}

/// True when a field reads like a CPU or memory quantity rather than a name
fn looks_like_quantity(field: &str) -> bool {
    field.ends_with('m') || field.ends_with("Mi") || field.ends_with("Gi")
}

/// Parse `kubectl top node --no-headers` output
pub fn parse_node_rows(text: &str) -> Vec<NodeRecord> {
    rows(text)
        .filter(|fields| fields.len() >= 5)
        .map(|fields| NodeRecord {
            name: fields[0].to_string(),
            usage: ResourcePair::new(fields[1], fields[3]),
            cpu_percent: percent_from_text(fields[2]),
            memory_percent: percent_from_text(fields[4]),
            allocatable: None,
            capacity: None,
        })
        .collect()
}

/// Parse `kubectl top pod --no-headers` output.
///
/// A row with a name-like second field is the all-namespaces layout;
/// anything else with three fields gets `default_namespace`.
pub fn parse_pod_rows(text: &str, default_namespace: &str) -> Vec<PodRecord> {
    rows(text)
        .filter_map(|fields| {
            if fields.len() >= 4 && !looks_like_quantity(fields[1]) {
                Some(PodRecord::new(
                    fields[1],
                    fields[0],
                    ResourcePair::new(fields[2], fields[3]),
                ))
            } else if fields.len() >= 3 {
                Some(PodRecord::new(
                    fields[0],
                    default_namespace,
                    ResourcePair::new(fields[1], fields[2]),
                ))
            } else {
                None
            }
        })
        .collect()
}

/// Parse `kubectl top pod --containers --no-headers` output
pub fn parse_container_rows(text: &str) -> Vec<ContainerRecord> {
    rows(text)
        .filter_map(|fields| match fields.len() {
            n if n >= 5 => Some(ContainerRecord::new(
                fields[2],
                ResourcePair::new(fields[3], fields[4]),
            )),
            4 => Some(ContainerRecord::new(
                fields[1],
                ResourcePair::new(fields[2], fields[3]),
            )),
            _ => None,
        })
        .collect()
}
