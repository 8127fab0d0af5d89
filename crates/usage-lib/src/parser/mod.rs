//! Parsing of kubectl output
//!
//! This module turns the header-less tables printed by
//! `kubectl top node|pod|pod --containers` and the YAML descriptors printed
//! by `kubectl get -o yaml` into typed records. Every parser is
//! best-effort: rows that match no known layout are dropped without
//! failing the whole parse.

mod descriptor;
mod table;


pub use descriptor::{parse_node_resources, parse_requests_limits, LOOKAHEAD_LINES};
pub use table::{parse_container_rows, parse_node_rows, parse_pod_rows};
