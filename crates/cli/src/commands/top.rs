//! `kusage top` subcommands
//!
//! Each subcommand is an explicit query: the scope and names come from the
//! arguments and no question text is classified.

use crate::TopCommands;
use usage_lib::{QueryOptions, Scope};

/// Explicit query options for a `top` subcommand
pub fn options(command: TopCommands) -> QueryOptions {
    match command {
        TopCommands::Cluster { sort } => QueryOptions {
            scope: Some(Scope::Cluster),
            sort,
            ..QueryOptions::default()
        },
        TopCommands::Nodes { name, sort, limit } => QueryOptions {
            scope: Some(Scope::Node),
            node: name,
            sort,
            limit,
            ..QueryOptions::default()
        },
        TopCommands::Namespace { name, sort } => QueryOptions {
            scope: Some(Scope::Namespace),
            namespace: name,
            sort,
            ..QueryOptions::default()
        },
        TopCommands::Pods {
            name,
            namespace,
            all_namespaces,
            sort,
            limit,
        } => QueryOptions {
            scope: Some(Scope::Pod),
            pod: name,
            namespace,
            all_namespaces,
            sort,
            limit,
            ..QueryOptions::default()
        },
        TopCommands::Containers {
            pod,
            container,
            namespace,
            sort,
            limit,
        } => QueryOptions {
            scope: Some(Scope::Container),
            pod: Some(pod),
            container,
            namespace,
            sort,
            limit,
            ..QueryOptions::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usage_lib::SortKey;

    #[test]
    fn test_nodes_options() {
        let options = options(TopCommands::Nodes {
            name: None,
            sort: Some(SortKey::Cpu),
            limit: Some(3),
        });

        assert_eq!(options.scope, Some(Scope::Node));
        assert_eq!(options.sort, Some(SortKey::Cpu));
        assert_eq!(options.limit, Some(3));
        assert!(options.node.is_none());
    }

    #[test]
    fn test_containers_options_carry_pod() {
        let options = options(TopCommands::Containers {
            pod: "web-0".into(),
            container: Some("nginx".into()),
            namespace: Some("shop".into()),
            sort: None,
            limit: None,
        });

        assert_eq!(options.scope, Some(Scope::Container));
        assert_eq!(options.pod.as_deref(), Some("web-0"));
        assert_eq!(options.container.as_deref(), Some("nginx"));
        assert_eq!(options.namespace.as_deref(), Some("shop"));
    }
}
