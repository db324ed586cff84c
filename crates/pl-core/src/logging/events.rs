//! Structured event vocabulary for logging.
//!
//! Every event carries an `event` field naming what happened and, when it
//! runs inside a query, a `stage` from the enclosing span.

use serde::{Deserialize, Serialize};

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Phases of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration loading.
    Init,
    /// Spawning the utility and draining its output.
    Query,
    /// Row decoding.
    Parse,
    /// Rendering results to stdout.
    Output,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Query => "query",
            Stage::Parse => "parse",
            Stage::Output => "output",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_WARNING: &str = "config.warning";
    pub const CONFIG_ERROR: &str = "config.error";

    // Query
    pub const QUERY_STARTED: &str = "query.started";
    pub const QUERY_SPAWNED: &str = "query.spawned";
    pub const QUERY_ROW_ISSUE: &str = "query.row_issue";
    pub const QUERY_FINISHED: &str = "query.finished";
    pub const QUERY_FAILED: &str = "query.failed";
    pub const QUERY_TIMEOUT: &str = "query.timeout";

    // Output
    pub const OUTPUT_WRITTEN: &str = "output.written";
}
