//! Common types for process listing.
//!
//! These types represent the structured output of a query: the per-process
//! records and the metadata describing how the snapshot was taken.

use pl_common::ProcessId;
use serde::{Deserialize, Serialize};

/// Process status as reported by verbose listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Running,
    Suspended,
    NotResponding,
    Unknown,
}

impl ProcessStatus {
    /// Parse the status column. Anything unrecognized maps to `Unknown`.
    pub fn from_column(s: &str) -> Self {
        match s.trim() {
            "Running" => ProcessStatus::Running,
            "Suspended" => ProcessStatus::Suspended,
            "Not Responding" => ProcessStatus::NotResponding,
            _ => ProcessStatus::Unknown,
        }
    }
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessStatus::Running => "Running",
            ProcessStatus::Suspended => "Suspended",
            ProcessStatus::NotResponding => "Not Responding",
            ProcessStatus::Unknown => "Unknown",
        };
        write!(f, "{}", s)
    }
}

/// A single process observed at query time.
///
/// `name` and `pid` are always present. Every other field is populated only
/// when the query mode includes the matching column, so the set of `Some`
/// fields is the same for every record of one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    /// Image name.
    pub name: String,

    /// Process ID.
    pub pid: ProcessId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_number: Option<u32>,

    /// Resident memory in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_usage: Option<u64>,

    /// Status column, verbatim. See [`ProcessRecord::status_kind`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Accumulated CPU time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_time: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_title: Option<String>,

    /// Loaded modules (modules mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<String>>,

    /// Hosted services (services mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,

    /// Store-app package (apps mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

impl ProcessRecord {
    /// Typed view of the status column.
    pub fn status_kind(&self) -> Option<ProcessStatus> {
        self.status.as_deref().map(ProcessStatus::from_column)
    }

    /// Whether the record carries the given module (case-insensitive, as on Windows).
    pub fn has_module(&self, module: &str) -> bool {
        self.modules
            .as_ref()
            .is_some_and(|m| m.iter().any(|name| name.eq_ignore_ascii_case(module)))
    }
}

/// Metadata about how a listing was produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryMetadata {
    /// Program that was invoked.
    pub program: String,

    /// Mode the rows were decoded with.
    pub mode: String,

    /// Target host, if remote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// RFC 3339 timestamp when the query started.
    pub started_at: String,

    /// Wall time including process startup.
    pub duration_ms: u64,

    /// Exit code of the utility, when it exited normally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    /// Total lines read from stdout.
    pub lines_read: usize,

    /// Lines discarded as headers, separators, or informational messages.
    pub lines_skipped: usize,

    /// Degraded-row findings, one entry per problem.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Result of a successful listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOutput {
    pub records: Vec<ProcessRecord>,
    pub metadata: QueryMetadata,
}
