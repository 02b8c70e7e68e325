//! Structured error types shared across ReCom crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`RecomError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (identifiers, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the ReCom workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum RecomError {
    /// Malformed graph input or attribute lookups.
    #[error("graph error: {0}")]
    Graph(ErrorInfo),
    /// The bipartition oracle found no balanced contiguous split within budget.
    #[error("oracle error: {0}")]
    Oracle(ErrorInfo),
    /// Invalid run configuration, surfaced before any chain step.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Invalid assignments or partitions.
    #[error("partition error: {0}")]
    Partition(ErrorInfo),
    /// Fatal sampler conditions.
    #[error("chain error: {0}")]
    Chain(ErrorInfo),
    /// I/O, serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl RecomError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            RecomError::Graph(info)
            | RecomError::Oracle(info)
            | RecomError::Config(info)
            | RecomError::Partition(info)
            | RecomError::Chain(info)
            | RecomError::Serde(info) => info,
        }
    }

    /// Returns the stable error code carried by the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Whether this is an oracle failure.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, RecomError::Oracle(_))
    }
}
