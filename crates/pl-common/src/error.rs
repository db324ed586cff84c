//! Error types for process_list.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Configuration Error
//!   Reason: config file not found: /etc/process-list/config.toml
//!   Fix: Check the --config path or PL_CONFIG, or remove it to use defaults.
//! ```
//!
//! Note that process queries themselves never produce these errors: a failed
//! `tasklist.exe` invocation degrades to an empty result. This type covers the
//! surfaces around the query (configuration, arguments, output).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for process_list operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors.
    Config,
    /// Invalid command-line arguments or option combinations.
    Args,
    /// Process listing errors.
    Collection,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Args => write!(f, "args"),
            ErrorCategory::Collection => write!(f, "collection"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for process_list.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    // Argument errors (20-29)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Collection errors (30-39)
    #[error("process {pid} not found")]
    ProcessNotFound { pid: u32 },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Argument errors
    /// - 30-39: Collection errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::ConfigNotFound(_) => 11,
            Error::InvalidArgument(_) => 20,
            Error::ProcessNotFound { .. } => 31,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::ConfigNotFound(_) => ErrorCategory::Config,
            Error::InvalidArgument(_) => ErrorCategory::Args,
            Error::ProcessNotFound { .. } => ErrorCategory::Collection,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Check the syntax of config.toml, or run 'pl-core config show'.",
            Error::ConfigNotFound(_) => {
                "Check the --config path or PL_CONFIG, or remove it to use defaults."
            }
            Error::InvalidArgument(_) => "Run 'pl-core --help' for the list of accepted options.",
            Error::ProcessNotFound { .. } => {
                "The process may have exited. Run 'pl-core list' to see current processes."
            }
            Error::Io(_) => "Check permissions and that stdout is writable. Retry the operation.",
            Error::Json(_) => "Internal serialization issue. Report as a bug.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::ConfigNotFound(_) => "Configuration Not Found",
            Error::InvalidArgument(_) => "Invalid Argument",
            Error::ProcessNotFound { .. } => "Process Not Found",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Remediation hint.
    pub remediation: String,

    /// Additional structured context (e.g., pid, file path).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();
        match err {
            Error::ProcessNotFound { pid } => {
                context.insert("pid".to_string(), serde_json::json!(pid));
            }
            Error::ConfigNotFound(path) => {
                context.insert("path".to_string(), serde_json::json!(path));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            remediation: err.remediation().to_string(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
