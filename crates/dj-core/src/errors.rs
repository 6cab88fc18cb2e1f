//! Structured error types shared across the dijet release crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`DjError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (file names, object names, sizes).
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
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Records a filesystem path under the `path` context key.
    pub fn with_path(self, path: &Path) -> Self {
        self.with_context("path", path.display().to_string())
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the release tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum DjError {
    /// Histogram and graph extraction or reshaping errors.
    #[error("histogram error: {0}")]
    Hist(ErrorInfo),
    /// HepData table assembly and validation errors.
    #[error("table error: {0}")]
    Table(ErrorInfo),
    /// Grid job descriptor errors.
    #[error("job error: {0}")]
    Job(ErrorInfo),
    /// Filesystem errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
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

impl DjError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            DjError::Hist(info)
            | DjError::Table(info)
            | DjError::Job(info)
            | DjError::Io(info)
            | DjError::Serde(info) => info,
        }
    }

    /// Adds a context entry to the payload, whatever the family.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            DjError::Hist(info) => DjError::Hist(info.with_context(key, value)),
            DjError::Table(info) => DjError::Table(info.with_context(key, value)),
            DjError::Job(info) => DjError::Job(info.with_context(key, value)),
            DjError::Io(info) => DjError::Io(info.with_context(key, value)),
            DjError::Serde(info) => DjError::Serde(info.with_context(key, value)),
        }
    }

    /// Wraps an I/O failure on `path` under the given code.
    pub fn io(code: &str, path: &Path, err: impl ToString) -> Self {
        DjError::Io(ErrorInfo::new(code, err.to_string()).with_path(path))
    }
}
