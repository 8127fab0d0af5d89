//! Error types for the usage pipeline

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, UsageError>;

/// Failures a query can end in.
///
/// Malformed table rows and failed enrichment lookups are absorbed by the
/// parser and aggregator and never show up here.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("`{command}` failed: {message}")]
    Fetch { command: String, message: String },

    #[error("`{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("{kind} {name:?} not found{}", namespace_suffix(.namespace))]
    NotFound {
        kind: &'static str,
        name: String,
        namespace: Option<String>,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("query cancelled")]
    Cancelled,
}

fn namespace_suffix(namespace: &Option<String>) -> String {
    match namespace {
        Some(ns) => format!(" in namespace {:?}", ns),
        None => String::new(),
    }
}

impl UsageError {
    /// Machine-readable code carried by error envelopes
    pub fn code(&self) -> &'static str {
        match self {
            UsageError::Fetch { .. } => "fetch_failed",
            UsageError::Timeout { .. } => "timeout",
            UsageError::NotFound { .. } => "not_found",
            UsageError::InvalidRequest(_) => "invalid_request",
            UsageError::Cancelled => "cancelled",
        }
    }

    pub fn fetch(command: impl Into<String>, message: impl Into<String>) -> Self {
        UsageError::Fetch {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>, namespace: Option<&str>) -> Self {
        UsageError::NotFound {
            kind,
            name: name.into(),
            namespace: namespace.map(str::to_string),
        }
    }
}
