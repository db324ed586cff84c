//! Column schema for each listing mode.
//!
//! The utility emits a fixed column order per mode. The schema is resolved
//! once per query from the options, before any row is read, and every row of
//! that query is decoded against it.

use super::options::QueryOptions;
use serde::{Deserialize, Serialize};

/// How a column's raw text is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Verbatim text.
    Text,
    /// Decimal integer.
    Integer,
    /// `"6,000 K"` style kilobytes, stored as bytes.
    Memory,
    /// `H:MM:SS`, stored as seconds.
    Duration,
    /// Comma-separated names.
    List,
}

/// A column the utility can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Name,
    Pid,
    SessionName,
    SessionNumber,
    MemUsage,
    Status,
    Username,
    CpuTime,
    WindowTitle,
    Modules,
    Services,
    PackageName,
}

impl FieldName {
    /// Static coercion table.
    pub fn kind(self) -> FieldKind {
        match self {
            FieldName::Name
            | FieldName::SessionName
            | FieldName::Status
            | FieldName::Username
            | FieldName::WindowTitle
            | FieldName::PackageName => FieldKind::Text,
            FieldName::Pid | FieldName::SessionNumber => FieldKind::Integer,
            FieldName::MemUsage => FieldKind::Memory,
            FieldName::CpuTime => FieldKind::Duration,
            FieldName::Modules | FieldName::Services => FieldKind::List,
        }
    }

    /// Record key, as used in serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Pid => "pid",
            FieldName::SessionName => "sessionName",
            FieldName::SessionNumber => "sessionNumber",
            FieldName::MemUsage => "memUsage",
            FieldName::Status => "status",
            FieldName::Username => "username",
            FieldName::CpuTime => "cpuTime",
            FieldName::WindowTitle => "windowTitle",
            FieldName::Modules => "modules",
            FieldName::Services => "services",
            FieldName::PackageName => "packageName",
        }
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing mode, after precedence has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    Default,
    Verbose,
    Apps,
    AppsVerbose,
    Modules,
    Services,
}

impl QueryMode {
    /// Apply the precedence modules > services > apps (+verbose) > verbose > default.
    pub fn resolve(options: &QueryOptions) -> Self {
        if options.modules.is_requested() {
            QueryMode::Modules
        } else if options.services {
            QueryMode::Services
        } else if options.apps {
            if options.verbose {
                QueryMode::AppsVerbose
            } else {
                QueryMode::Apps
            }
        } else if options.verbose {
            QueryMode::Verbose
        } else {
            QueryMode::Default
        }
    }

    pub fn fields(self) -> &'static [FieldName] {
        match self {
            QueryMode::Default => DEFAULT_FIELDS,
            QueryMode::Verbose => VERBOSE_FIELDS,
            QueryMode::Apps => APPS_FIELDS,
            QueryMode::AppsVerbose => APPS_VERBOSE_FIELDS,
            QueryMode::Modules => MODULES_FIELDS,
            QueryMode::Services => SERVICES_FIELDS,
        }
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            QueryMode::Default => "default",
            QueryMode::Verbose => "verbose",
            QueryMode::Apps => "apps",
            QueryMode::AppsVerbose => "apps_verbose",
            QueryMode::Modules => "modules",
            QueryMode::Services => "services",
        };
        f.write_str(s)
    }
}

use FieldName::*;

const DEFAULT_FIELDS: &[FieldName] = &[Name, Pid, SessionName, SessionNumber, MemUsage];

const VERBOSE_FIELDS: &[FieldName] = &[
    Name,
    Pid,
    SessionName,
    SessionNumber,
    MemUsage,
    Status,
    Username,
    CpuTime,
    WindowTitle,
];

const APPS_FIELDS: &[FieldName] = &[Name, Pid, MemUsage, PackageName];

const APPS_VERBOSE_FIELDS: &[FieldName] = &[
    Name,
    Pid,
    SessionName,
    SessionNumber,
    MemUsage,
    Status,
    Username,
    CpuTime,
    WindowTitle,
    PackageName,
];

const MODULES_FIELDS: &[FieldName] = &[Name, Pid, Modules];

const SERVICES_FIELDS: &[FieldName] = &[Name, Pid, Services];

/// Ordered column list for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    mode: QueryMode,
}

impl Schema {
    pub fn resolve(options: &QueryOptions) -> Self {
        Self::for_mode(QueryMode::resolve(options))
    }

    pub fn for_mode(mode: QueryMode) -> Self {
        Schema { mode }
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn fields(&self) -> &'static [FieldName] {
        self.mode.fields()
    }

    /// Fields paired with their coercion kind, in column order.
    pub fn columns(&self) -> impl Iterator<Item = (FieldName, FieldKind)> {
        self.fields().iter().map(|f| (*f, f.kind()))
    }

    pub fn len(&self) -> usize {
        self.fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.fields().contains(&field)
    }
}
