//! Line scanners for `kubectl get -o yaml` descriptors
//!
//! These are deliberately not YAML parsers. They walk the document line by
//! line and rely on the order kubectl prints keys in: a node's
//! `metadata.name` comes before `status.allocatable`, which comes before
//! `status.capacity`. Documents in another order may attribute values to the
//! wrong node or section.

use crate::models::{NodeResources, RequestsLimits, ResourcePair};

/// Lines scanned after a `requests:` / `limits:` marker
pub const LOOKAHEAD_LINES: usize = 5;

/// Split a trimmed `key: value` line, dropping list dashes and quotes
fn key_value(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let line = line.strip_prefix("- ").unwrap_or(line);
    let (key, value) = line.split_once(':')?;
    let value = value.trim().trim_matches('"').trim_matches('\'');
    Some((key.trim(), value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekingNode,
    InAllocatable,
    InCapacity,
}

#[derive(Debug, Default)]
struct PendingNode {
    name: Option<String>,
    allocatable_cpu: Option<String>,
    allocatable_memory: Option<String>,
    capacity_cpu: Option<String>,
    capacity_memory: Option<String>,
}

impl PendingNode {
    fn values_complete(&self) -> bool {
        self.allocatable_cpu.is_some()
            && self.allocatable_memory.is_some()
            && self.capacity_cpu.is_some()
            && self.capacity_memory.is_some()
    }

    fn into_resources(self) -> Option<NodeResources> {
        Some(NodeResources {
            name: self.name?,
            allocatable: ResourcePair::new(self.allocatable_cpu?, self.allocatable_memory?),
            capacity: ResourcePair::new(self.capacity_cpu?, self.capacity_memory?),
        })
    }
}

/// Scan a node list descriptor for per-node allocatable and capacity.
///
/// One record is emitted per node once allocatable and capacity cpu/memory
/// have all been seen, after which the scan looks for the next node name.
pub fn parse_node_resources(document: &str) -> Vec<NodeResources> {
    let mut records = Vec::new();
    let mut state = ScanState::SeekingNode;
    let mut pending = PendingNode::default();

    for line in document.lines() {
        let Some((key, value)) = key_value(line) else {
            continue;
        };

        match (key, state) {
            ("allocatable", _) if value.is_empty() => state = ScanState::InAllocatable,
            ("capacity", _) if value.is_empty() => state = ScanState::InCapacity,
            ("name", ScanState::SeekingNode) if !value.is_empty() => {
                pending.name = Some(value.to_string());
            }
            ("cpu", ScanState::InAllocatable) => {
                pending.allocatable_cpu.get_or_insert_with(|| value.to_string());
            }
            ("memory", ScanState::InAllocatable) => {
                pending.allocatable_memory.get_or_insert_with(|| value.to_string());
            }
            ("cpu", ScanState::InCapacity) => {
                pending.capacity_cpu.get_or_insert_with(|| value.to_string());
            }
            ("memory", ScanState::InCapacity) => {
                pending.capacity_memory.get_or_insert_with(|| value.to_string());
            }
            _ => {}
        }

        if pending.values_complete() {
            if let Some(resources) = std::mem::take(&mut pending).into_resources() {
                records.push(resources);
            }
            state = ScanState::SeekingNode;
        }
    }

    records
}

/// First `cpu:` and `memory:` within the look-ahead window after `marker`
fn scan_marker(lines: &[&str], marker: &str) -> Option<ResourcePair> {
    let start = lines.iter().position(|line| line.trim() == marker)?;
    let window = lines.iter().skip(start + 1).take(LOOKAHEAD_LINES);

    let mut cpu = None;
    let mut memory = None;
    for line in window {
        match key_value(line) {
            Some(("cpu", value)) if cpu.is_none() => cpu = Some(value.to_string()),
            Some(("memory", value)) if memory.is_none() => memory = Some(value.to_string()),
            _ => {}
        }
    }

    if cpu.is_none() && memory.is_none() {
        return None;
    }
    Some(ResourcePair::new(
        cpu.unwrap_or_default(),
        memory.unwrap_or_default(),
    ))
}

fn indent(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// End of the list entry whose key sits on `anchor`: the first later
/// non-blank line indented less than the entry's keys.
fn entry_end(lines: &[&str], anchor: usize) -> usize {
    let line = lines[anchor];
    let key_indent = match line.trim_start().strip_prefix("- ") {
        Some(_) => indent(line) + 2,
        None => indent(line),
    };

    lines
        .iter()
        .enumerate()
        .skip(anchor + 1)
        .find(|(_, line)| !line.trim().is_empty() && indent(line) < key_indent)
        .map(|(index, _)| index)
        .unwrap_or(lines.len())
}

/// Scan a pod descriptor for requests and limits.
///
/// Without an anchor the first `requests:`/`limits:` blocks in the document
/// win, which for a multi-container pod means the first container's. With
/// `container` set the scan covers only that container's entry, starting at
/// its `name:` line; when the line is absent nothing is returned.
pub fn parse_requests_limits(document: &str, container: Option<&str>) -> RequestsLimits {
    let lines: Vec<&str> = document.lines().collect();

    let (start, end) = match container {
        Some(name) => {
            let anchor = lines
                .iter()
                .position(|line| matches!(key_value(line), Some(("name", value)) if value == name));
            match anchor {
                Some(index) => (index, entry_end(&lines, index)),
                None => return RequestsLimits::default(),
            }
        }
        None => (0, lines.len()),
    };

    let scoped = &lines[start..end];
    RequestsLimits {
        requests: scan_marker(scoped, "requests:"),
        limits: scan_marker(scoped, "limits:"),
    }
}
