//! Row decoding for `tasklist /fo csv` output.
//!
//! Rows look like `"notepad.exe","1234","Console","1","6,000 K"`. Every field
//! is quoted and fields are separated by exactly `","`, so a row is split on
//! that delimiter after stripping the outer quotes. This is not general CSV:
//! embedded quotes are not unescaped, which matches what the utility emits.
//!
//! Decoding never fails. Column-count mismatches and unparseable values
//! degrade to empty/zero values and are reported as [`RowIssue`]s alongside
//! the record.

use super::schema::{FieldKind, FieldName, Schema};
use super::types::ProcessRecord;
use pl_common::ProcessId;

/// Field delimiter inside a quoted row.
const DELIMITER: &str = "\",\"";

/// Something that had to be degraded while decoding a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIssue {
    /// Row had a different number of columns than the schema.
    ColumnCount { expected: usize, actual: usize },
    /// Integer column was not a valid number or did not fit in 32 bits;
    /// stored as 0.
    InvalidNumber { field: FieldName, raw: String },
    /// Duration column was not `H:MM:SS`; missing or bad segments count as 0.
    InvalidDuration { field: FieldName, raw: String },
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowIssue::ColumnCount { expected, actual } => {
                write!(f, "expected {} columns, got {}", expected, actual)
            }
            RowIssue::InvalidNumber { field, raw } => {
                write!(f, "invalid number for {}: {:?}", field, raw)
            }
            RowIssue::InvalidDuration { field, raw } => {
                write!(f, "invalid duration for {}: {:?}", field, raw)
            }
        }
    }
}

/// A decoded row plus anything that went wrong decoding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub record: ProcessRecord,
    pub issues: Vec<RowIssue>,
}

impl ParsedRow {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Whether a stdout line is a data row. Headers, separators, blank lines and
/// `INFO:` messages never start with a quote.
pub fn is_data_line(line: &str) -> bool {
    line.starts_with('"')
}

/// Split a quoted row into raw column tokens.
pub fn split_row(line: &str) -> Vec<&str> {
    let inner = line.strip_prefix('"').unwrap_or(line);
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    inner.split(DELIMITER).collect()
}

/// A single coerced column value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Text(String),
    Integer(u64),
    List(Vec<String>),
}

/// Decode one data row against the schema.
pub fn parse_line(line: &str, schema: &Schema) -> ParsedRow {
    let tokens = split_row(line);
    let mut issues = Vec::new();

    if tokens.len() != schema.len() {
        issues.push(RowIssue::ColumnCount {
            expected: schema.len(),
            actual: tokens.len(),
        });
    }

    let mut record = ProcessRecord::default();
    for (idx, (field, kind)) in schema.columns().enumerate() {
        // Missing trailing columns are already reported by ColumnCount.
        let value = match tokens.get(idx) {
            Some(raw) => coerce(field, kind, raw, &mut issues),
            None => empty_value(kind),
        };
        assign(&mut record, field, value);
    }

    ParsedRow { record, issues }
}

fn empty_value(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Text => Value::Text(String::new()),
        FieldKind::Integer | FieldKind::Memory | FieldKind::Duration => Value::Integer(0),
        FieldKind::List => Value::List(Vec::new()),
    }
}

fn coerce(field: FieldName, kind: FieldKind, raw: &str, issues: &mut Vec<RowIssue>) -> Value {
    match kind {
        FieldKind::Text => Value::Text(raw.to_string()),
        FieldKind::Integer => {
            // PID and session number are 32-bit.
            let parsed = parse_integer(raw).filter(|n| u32::try_from(*n).is_ok());
            Value::Integer(parsed.unwrap_or_else(|| {
                issues.push(RowIssue::InvalidNumber {
                    field,
                    raw: raw.to_string(),
                });
                0
            }))
        }
        FieldKind::Memory => {
            let (bytes, overflowed) = parse_memory(raw);
            if overflowed {
                issues.push(RowIssue::InvalidNumber {
                    field,
                    raw: raw.to_string(),
                });
            }
            Value::Integer(bytes)
        }
        FieldKind::Duration => {
            let (secs, well_formed) = parse_duration(raw);
            if !well_formed {
                issues.push(RowIssue::InvalidDuration {
                    field,
                    raw: raw.to_string(),
                });
            }
            Value::Integer(secs)
        }
        FieldKind::List => Value::List(parse_list(raw)),
    }
}

fn assign(record: &mut ProcessRecord, field: FieldName, value: Value) {
    match (field, value) {
        (FieldName::Name, Value::Text(s)) => record.name = s,
        (FieldName::Pid, Value::Integer(n)) => record.pid = ProcessId(narrow(n)),
        (FieldName::SessionName, Value::Text(s)) => record.session_name = Some(s),
        (FieldName::SessionNumber, Value::Integer(n)) => {
            record.session_number = Some(narrow(n))
        }
        (FieldName::MemUsage, Value::Integer(n)) => record.mem_usage = Some(n),
        (FieldName::Status, Value::Text(s)) => record.status = Some(s),
        (FieldName::Username, Value::Text(s)) => record.username = Some(s),
        (FieldName::CpuTime, Value::Integer(n)) => record.cpu_time = Some(n),
        (FieldName::WindowTitle, Value::Text(s)) => record.window_title = Some(s),
        (FieldName::Modules, Value::List(v)) => record.modules = Some(v),
        (FieldName::Services, Value::List(v)) => record.services = Some(v),
        (FieldName::PackageName, Value::Text(s)) => record.package_name = Some(s),
        // The kind table and this match are kept in step by the tests below.
        (field, value) => debug_assert!(false, "{field} cannot hold {value:?}"),
    }
}

/// Integer values are range-checked in `coerce`.
fn narrow(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(0)
}

/// Parse a decimal integer column. Surrounding whitespace is tolerated.
pub fn parse_integer(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

/// Parse a memory column (`"1,234 K"`) into bytes.
///
/// Every non-digit character is dropped before parsing, so separators and
/// the unit suffix disappear. No digits at all means 0. Returns the value and
/// whether it saturated.
pub fn parse_memory(raw: &str) -> (u64, bool) {
    let mut kb: u64 = 0;
    let mut overflowed = false;
    for digit in raw.chars().filter_map(|c| c.to_digit(10)) {
        match kb.checked_mul(10).and_then(|v| v.checked_add(u64::from(digit))) {
            Some(v) => kb = v,
            None => {
                overflowed = true;
                kb = u64::MAX;
                break;
            }
        }
    }
    match kb.checked_mul(1024) {
        Some(bytes) => (bytes, overflowed),
        None => (u64::MAX, true),
    }
}

/// Parse a CPU time column (`H:MM:SS`) into seconds. Hours are unbounded.
///
/// Returns the best-effort value and whether the input was well formed.
pub fn parse_duration(raw: &str) -> (u64, bool) {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    let mut well_formed = parts.len() == 3;

    let mut segment = |idx: usize| -> u64 {
        match parts.get(idx).map(|p| p.trim().parse::<u64>()) {
            Some(Ok(v)) => v,
            _ => {
                well_formed = false;
                0
            }
        }
    };

    let hours = segment(0);
    let minutes = segment(1);
    let seconds = segment(2);

    let total = hours
        .saturating_mul(3600)
        .saturating_add(minutes.saturating_mul(60))
        .saturating_add(seconds);
    (total, well_formed)
}

/// Split a module/service column on `,`.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}
