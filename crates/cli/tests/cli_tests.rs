//! CLI integration tests

use std::process::{Command, Output};

fn kusage(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kusage"))
        .args(args)
        .env_remove("KUBECONFIG")
        .env_remove("KUSAGE_CONTEXT")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = kusage(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Kubernetes resource usage"),
        "Should show app description"
    );
    assert!(stdout.contains("query"), "Should show query command");
    assert!(stdout.contains("top"), "Should show top command");
    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("--kubeconfig"), "Should show kubeconfig option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = kusage(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("kusage"), "Should show binary name");
}

/// Test query subcommand help
#[test]
fn test_query_help() {
    let output = kusage(&["query", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Query help should succeed");
    assert!(stdout.contains("--scope"), "Should show scope option");
    assert!(stdout.contains("--namespace"), "Should show namespace option");
    assert!(stdout.contains("--all-namespaces"), "Should show all-namespaces option");
    assert!(stdout.contains("--sort"), "Should show sort option");
    assert!(stdout.contains("--limit"), "Should show limit option");
}

/// Test top subcommand help lists every scope
#[test]
fn test_top_help() {
    let output = kusage(&["top", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Top help should succeed");
    for scope in ["cluster", "nodes", "namespace", "pods", "containers"] {
        assert!(stdout.contains(scope), "Should show {} subcommand", scope);
    }
}

/// Test invalid command handling
#[test]
fn test_invalid_command() {
    let output = kusage(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");
}

/// Test that container usage requires a pod
#[test]
fn test_top_containers_requires_pod() {
    let output = kusage(&["top", "containers"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Missing pod should fail");
    assert!(stderr.contains("<POD>"), "Should name the missing argument");
}

/// Test that an unknown sort key is rejected by argument parsing
#[test]
fn test_invalid_sort_key() {
    let output = kusage(&["top", "nodes", "--sort", "disk"]);
    assert!(!output.status.success(), "Unknown sort key should fail");
}

#[cfg(unix)]
mod fake_kubectl {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SCRIPT: &str = r#"#!/bin/sh
case "$1 $2" in
  "top node")
    printf 'worker-1 250m 6%% 2147Mi 27%%\nworker-2 900m 27%% 1800Mi 22%%\n'
    ;;
  *)
    echo 'Error from server (Forbidden): access denied' >&2
    exit 1
    ;;
esac
"#;

    /// A fake kubectl plus an empty home directory, so no user config applies
    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("kubectl");
        std::fs::write(&script, SCRIPT).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        (dir, script)
    }

    fn run(dir: &TempDir, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_kusage"))
            .args(args)
            .env("HOME", dir.path())
            .env_remove("KUBECONFIG")
            .env_remove("KUSAGE_CONTEXT")
            .output()
            .expect("Failed to execute command")
    }

    #[test]
    fn test_top_nodes_json() {
        let (dir, script) = setup();
        let script = script.to_string_lossy().into_owned();

        let output = run(
            &dir,
            &["--kubectl", &script, "--format", "json", "top", "nodes", "--sort", "cpu"],
        );

        assert!(output.status.success(), "Query should succeed: {:?}", output);
        let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(envelope["kind"], "result");
        assert_eq!(envelope["payload"]["scope"], "nodes");
        assert_eq!(envelope["payload"]["data"][0]["name"], "worker-2");
        assert_eq!(envelope["payload"]["data"][1]["name"], "worker-1");
    }

    #[test]
    fn test_failed_fetch_exits_non_zero() {
        let (dir, script) = setup();
        let script = script.to_string_lossy().into_owned();

        let output = run(
            &dir,
            &["--kubectl", &script, "query", "show pods in namespace shop"],
        );

        assert!(!output.status.success(), "Failed fetch should exit non-zero");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("fetch_failed"));
        assert!(stderr.contains("access denied"));
    }
}
