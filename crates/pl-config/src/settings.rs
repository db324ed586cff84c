//! Typed model for `config.toml`.
//!
//! ```toml
//! [tasklist]
//! program = "tasklist.exe"
//! timeout_secs = 30
//!
//! [query]
//! system = "host01"
//! username = "admin"
//! verbose = true
//! filters = ["STATUS eq RUNNING"]
//! ```
//!
//! Passwords are deliberately absent from the file model; they come from the
//! command line or `PL_PASSWORD` only.

use crate::validate::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default utility invoked for process listing.
pub const DEFAULT_PROGRAM: &str = "tasklist.exe";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// How the listing utility is invoked.
    pub tasklist: TaskListSettings,

    /// Default query options applied before CLI flags.
    pub query: QueryDefaults,
}

/// `[tasklist]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskListSettings {
    /// Program name or path.
    pub program: String,

    /// Kill the utility after this many seconds. Absent means wait forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for TaskListSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            timeout_secs: None,
        }
    }
}

impl TaskListSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// `modules = true` or `modules = "ntdll.dll"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModulesSetting {
    Flag(bool),
    Name(String),
}

/// `[query]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<ModulesSetting>,

    pub services: bool,
    pub apps: bool,
    pub verbose: bool,

    /// Raw `/fi` predicates, ANDed by the utility.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
}

impl QueryDefaults {
    /// Whether the `modules` key asks for module listing at all.
    pub fn modules_requested(&self) -> bool {
        match &self.modules {
            Some(ModulesSetting::Flag(enabled)) => *enabled,
            Some(ModulesSetting::Name(name)) => !name.is_empty(),
            None => false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_toml(&content)
    }

    /// Parse settings from a TOML string.
    ///
    /// The error carries the parser's message and line but not the source
    /// snippet, which could echo a credential placed in the wrong key.
    pub fn parse_toml(content: &str) -> ValidationResult<Self> {
        toml::from_str(content).map_err(|e| {
            let line = e
                .span()
                .and_then(|span| content.get(..span.start))
                .map(|prefix| prefix.matches('\n').count() + 1);
            let message = e.message().trim_end();
            ValidationError::ParseError(match line {
                Some(line) => format!("Invalid TOML at line {}: {}", line, message),
                None => format!("Invalid TOML: {}", message),
            })
        })
    }

    /// Render settings back to TOML.
    pub fn to_toml(&self) -> ValidationResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ValidationError::ParseError(format!("Cannot render TOML: {}", e)))
    }
}
