//! Keyword classification of free-text queries
//!
//! This is a bounded substring heuristic over the lowercased query, not
//! language understanding. Keyword tables are evaluated in order and the
//! first hit wins.

use super::{QueryIntent, Scope, SortKey};

/// Scope keywords in precedence order. Several can appear in one query
/// ("containers in pod web-0"), so the order is significant.
const SCOPE_KEYWORDS: &[(&str, Scope)] = &[
    ("node", Scope::Node),
    ("container", Scope::Container),
    ("pod", Scope::Pod),
    ("namespace", Scope::Namespace),
];

const NAMESPACE_MARKERS: &[&str] = &["namespace ", "ns ", "-n ", "in namespace ", "in ns "];

const NODE_MARKERS: &[&str] = &["node ", "for node "];
const POD_MARKERS: &[&str] = &["pod ", "for pod "];
const CONTAINER_MARKERS: &[&str] = &["container ", "for container "];

const SUPERLATIVES: &[&str] = &["most", "top", "highest"];

/// Words that follow a marker in ordinary phrasing ("node metrics",
/// "namespace usage") and are never resource names
const GENERIC_WORDS: &[&str] = &[
    "metrics",
    "metric",
    "usage",
    "utilization",
    "resources",
    "resource",
    "stats",
    "details",
    "info",
    "cpu",
    "memory",
    "by",
    "in",
    "with",
    "and",
    "for",
];

fn target_markers(scope: Scope) -> &'static [&'static str] {
    match scope {
        Scope::Node => NODE_MARKERS,
        Scope::Pod => POD_MARKERS,
        Scope::Container => CONTAINER_MARKERS,
        Scope::Cluster | Scope::Namespace => &[],
    }
}

/// First usable token after a marker, trying markers in list order. A
/// marker whose token is a generic word ("ns in", "pod metrics") is
/// skipped in favor of the next marker present in `text`.
fn token_after<'a>(text: &'a str, markers: &[&str]) -> Option<&'a str> {
    markers.iter().find_map(|marker| {
        let at = text.find(marker)?;
        text[at + marker.len()..]
            .split_whitespace()
            .next()
            .map(|token| token.trim_end_matches([',', '?']))
            .filter(|token| !token.is_empty() && !GENERIC_WORDS.contains(token))
    })
}

fn resource_name(text: &str, markers: &[&str]) -> Option<String> {
    token_after(text, markers).map(str::to_string)
}

fn detect_scope(text: &str) -> Scope {
    SCOPE_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, scope)| *scope)
        .unwrap_or_default()
}

fn detect_sort(text: &str) -> Option<SortKey> {
    let superlative = SUPERLATIVES.iter().any(|word| text.contains(word));
    if !superlative {
        return None;
    }
    if text.contains("cpu") {
        Some(SortKey::Cpu)
    } else if text.contains("memory") {
        Some(SortKey::Memory)
    } else {
        None
    }
}

/// Classify a free-text usage query
pub fn classify(query: &str) -> QueryIntent {
    let text = query.to_lowercase();
    let scope = detect_scope(&text);

    let pod = if scope == Scope::Container {
        resource_name(&text, POD_MARKERS)
    } else {
        None
    };

    QueryIntent {
        scope,
        target: resource_name(&text, target_markers(scope)),
        pod,
        namespace: resource_name(&text, NAMESPACE_MARKERS),
        sort: detect_sort(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_keywords() {
        assert_eq!(classify("show node metrics").scope, Scope::Node);
        assert_eq!(classify("pod metrics").scope, Scope::Pod);
        assert_eq!(classify("container metrics").scope, Scope::Container);
        assert_eq!(classify("namespace metrics").scope, Scope::Namespace);
        assert_eq!(classify("show metrics").scope, Scope::Cluster);
        assert_eq!(classify("Show NODES").scope, Scope::Node);
    }

    #[test]
    fn test_scope_precedence() {
        assert_eq!(classify("pods on node worker-1").scope, Scope::Node);
        assert_eq!(classify("containers in pod web-0").scope, Scope::Container);
        assert_eq!(classify("pods in namespace shop").scope, Scope::Pod);
    }

    #[test]
    fn test_namespace_markers() {
        let intent = classify("show pods in namespace kube-system");
        assert_eq!(intent.namespace.as_deref(), Some("kube-system"));

        let intent = classify("get pods -n default");
        assert_eq!(intent.namespace.as_deref(), Some("default"));

        let intent = classify("pods in ns payments");
        assert_eq!(intent.namespace.as_deref(), Some("payments"));

        assert_eq!(classify("show metrics").namespace, None);
    }

    #[test]
    fn test_namespace_marker_list_order_beats_text_order() {
        // "-n " appears first in the text, but "namespace " is earlier in
        // the marker list
        let intent = classify("pods -n one namespace two");
        assert_eq!(intent.namespace.as_deref(), Some("two"));
    }

    #[test]
    fn test_markers_are_plain_substrings() {
        // "ns " first matches inside "containers in", whose token is generic
        let intent = classify("show containers in pod web-0 -n shop");
        assert_eq!(intent.namespace.as_deref(), Some("shop"));

        assert_eq!(classify("list all pods").namespace, None);
        assert_eq!(
            classify("kubenode worker-1 status").target.as_deref(),
            Some("worker-1")
        );
    }

    #[test]
    fn test_generic_token_falls_through_to_next_marker() {
        let intent = classify("show namespace metrics -n shop");
        assert_eq!(intent.namespace.as_deref(), Some("shop"));

        let intent = classify("pod metrics for pod web-0");
        assert_eq!(intent.scope, Scope::Pod);
        assert_eq!(intent.target.as_deref(), Some("web-0"));

        let intent = classify("show usage for container nginx in pod web-0");
        assert_eq!(intent.scope, Scope::Container);
        assert_eq!(intent.target.as_deref(), Some("nginx"));
        assert_eq!(intent.pod.as_deref(), Some("web-0"));

        assert_eq!(classify("show node metrics?").target, None);
    }

    #[test]
    fn test_target_extraction() {
        let intent = classify("show metrics for node worker-1");
        assert_eq!(intent.scope, Scope::Node);
        assert_eq!(intent.target.as_deref(), Some("worker-1"));

        let intent = classify("how busy is pod web-0?");
        assert_eq!(intent.target.as_deref(), Some("web-0"));

        let intent = classify("container nginx, please");
        assert_eq!(intent.target.as_deref(), Some("nginx"));
    }

    #[test]
    fn test_generic_words_are_not_targets() {
        assert_eq!(classify("show node metrics").target, None);
        assert_eq!(classify("namespace usage").namespace, None);
        assert_eq!(classify("pod").target, None);
    }

    #[test]
    fn test_cluster_and_namespace_have_no_target() {
        assert_eq!(classify("cluster overview").target, None);
        assert_eq!(classify("namespace shop").target, None);
        assert_eq!(classify("namespace shop").namespace.as_deref(), Some("shop"));
    }

    #[test]
    fn test_container_scope_picks_up_pod() {
        let intent = classify("containers in pod web-0 -n shop");
        assert_eq!(intent.scope, Scope::Container);
        assert_eq!(intent.pod.as_deref(), Some("web-0"));
        assert_eq!(intent.target, None);
        assert_eq!(intent.namespace.as_deref(), Some("shop"));

        assert_eq!(classify("pod web-0").pod, None);
    }

    #[test]
    fn test_sort_detection() {
        assert_eq!(classify("which pods use the most cpu").sort, Some(SortKey::Cpu));
        assert_eq!(classify("top nodes by memory").sort, Some(SortKey::Memory));
        assert_eq!(
            classify("highest cpu and memory pods").sort,
            Some(SortKey::Cpu)
        );
        assert_eq!(classify("pods by cpu").sort, None);
        assert_eq!(classify("top pods").sort, None);
    }
}
