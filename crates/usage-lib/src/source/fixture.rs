//! In-memory data source for tests
//!
//! Responses are keyed by the kubectl command the real source would run,
//! without the `--namespace`/`-o yaml` plumbing:
//! - `run`: `"top node --no-headers"`
//! - `run_scoped`: `"top pod --no-headers -n shop"`
//! - `fetch_descriptor`: `"get nodes"`
//! - `fetch_resource_descriptor`: `"get pod web-0 -n shop"`
//!
//! Keys without a response fail with a fetch error.

use super::ClusterDataSource;
use crate::error::{Result, UsageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

enum Response {
    Body(String),
    Cancelled,
    Hang,
}

pub(crate) struct StaticSource {
    responses: HashMap<String, Response>,
    calls: Mutex<Vec<String>>,
}

impl StaticSource {
    pub(crate) fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with(mut self, key: &str, body: &str) -> Self {
        self.responses
            .insert(key.to_string(), Response::Body(body.to_string()));
        self
    }

    pub(crate) fn with_cancelled(mut self, key: &str) -> Self {
        self.responses.insert(key.to_string(), Response::Cancelled);
        self
    }

    pub(crate) fn with_hang(mut self, key: &str) -> Self {
        self.responses.insert(key.to_string(), Response::Hang);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self, key: String) -> Result<String> {
        self.calls.lock().unwrap().push(key.clone());
        match self.responses.get(&key) {
            Some(Response::Body(body)) => Ok(body.clone()),
            Some(Response::Cancelled) => Err(UsageError::Cancelled),
            Some(Response::Hang) => std::future::pending().await,
            None => Err(UsageError::fetch(key, "no fixture response")),
        }
    }
}

#[async_trait]
impl ClusterDataSource for StaticSource {
    fn source_id(&self) -> &str {
        "static"
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        self.respond(format!("top {}", args.join(" "))).await
    }

    async fn run_scoped(&self, namespace: &str, args: &[&str]) -> Result<String> {
        self.respond(format!("top {} -n {}", args.join(" "), namespace))
            .await
    }

    async fn fetch_descriptor(&self, args: &[&str]) -> Result<Vec<u8>> {
        self.respond(format!("get {}", args.join(" ")))
            .await
            .map(String::into_bytes)
    }

    async fn fetch_resource_descriptor(
        &self,
        kind: &str,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Vec<u8>> {
        let key = match namespace {
            Some(ns) => format!("get {} {} -n {}", kind, name, ns),
            None => format!("get {} {}", kind, name),
        };
        self.respond(key).await.map(String::into_bytes)
    }
}
