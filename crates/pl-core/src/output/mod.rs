//! Rendering query results for the CLI.
//!
//! stdout carries exactly one payload per invocation in the selected
//! [`OutputFormat`]. Logs never go here.

use crate::collect::{FieldName, ProcessRecord, QueryMetadata};
use pl_common::OutputFormat;
use serde::Serialize;
use std::io::{self, Write};

/// Widest a table cell may get before it is truncated.
const MAX_CELL_WIDTH: usize = 48;

/// Payload for `list`, `get`, and `find`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport<'a> {
    /// Subcommand that produced the report.
    pub command: &'a str,
    pub run_id: &'a str,
    pub generated_at: String,
    pub metadata: &'a QueryMetadata,
    pub process_count: usize,
    pub processes: &'a [ProcessRecord],
}

impl<'a> ProcessReport<'a> {
    pub fn new(
        command: &'a str,
        run_id: &'a str,
        metadata: &'a QueryMetadata,
        processes: &'a [ProcessRecord],
    ) -> Self {
        Self {
            command,
            run_id,
            generated_at: chrono::Utc::now().to_rfc3339(),
            metadata,
            process_count: processes.len(),
            processes,
        }
    }
}

/// Write `report` to `out` in `format`. `columns` drives the table layout.
pub fn write_report<W: Write>(
    out: &mut W,
    format: OutputFormat,
    report: &ProcessReport<'_>,
    columns: &[FieldName],
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Jsonl => {
            for record in report.processes {
                serde_json::to_writer(&mut *out, record)?;
                writeln!(out)?;
            }
        }
        OutputFormat::Table => write_table(out, report.processes, columns)?,
        OutputFormat::Summary => writeln!(out, "{}", summary_line(report))?,
    }
    out.flush()
}

/// One-line description of a report.
pub fn summary_line(report: &ProcessReport<'_>) -> String {
    let meta = report.metadata;
    let host = meta.system.as_deref().unwrap_or("local");
    let mut line = format!(
        "[{}] {}: {} process{} on {} ({} mode) in {}ms",
        report.run_id,
        report.command,
        report.process_count,
        if report.process_count == 1 { "" } else { "es" },
        host,
        meta.mode,
        meta.duration_ms
    );
    if !meta.warnings.is_empty() {
        line.push_str(&format!(", {} warning(s)", meta.warnings.len()));
    }
    line
}

fn column_header(field: FieldName) -> &'static str {
    match field {
        FieldName::Name => "NAME",
        FieldName::Pid => "PID",
        FieldName::SessionName => "SESSION",
        FieldName::SessionNumber => "SESS#",
        FieldName::MemUsage => "MEM",
        FieldName::Status => "STATUS",
        FieldName::Username => "USER",
        FieldName::CpuTime => "CPU TIME",
        FieldName::WindowTitle => "WINDOW",
        FieldName::Modules => "MODULES",
        FieldName::Services => "SERVICES",
        FieldName::PackageName => "PACKAGE",
    }
}

/// Text shown for one field of one record. Absent fields render empty.
pub fn cell(record: &ProcessRecord, field: FieldName) -> String {
    fn text(value: &Option<String>) -> String {
        value.clone().unwrap_or_default()
    }
    match field {
        FieldName::Name => record.name.clone(),
        FieldName::Pid => record.pid.to_string(),
        FieldName::SessionName => text(&record.session_name),
        FieldName::SessionNumber => record
            .session_number
            .map(|n| n.to_string())
            .unwrap_or_default(),
        FieldName::MemUsage => record.mem_usage.map(bytes_to_human).unwrap_or_default(),
        FieldName::Status => text(&record.status),
        FieldName::Username => text(&record.username),
        FieldName::CpuTime => record.cpu_time.map(format_cpu_time).unwrap_or_default(),
        FieldName::WindowTitle => text(&record.window_title),
        FieldName::Modules => record
            .modules
            .as_ref()
            .map(|m| m.join(","))
            .unwrap_or_default(),
        FieldName::Services => record
            .services
            .as_ref()
            .map(|s| s.join(","))
            .unwrap_or_default(),
        FieldName::PackageName => text(&record.package_name),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn write_table<W: Write>(
    out: &mut W,
    records: &[ProcessRecord],
    columns: &[FieldName],
) -> io::Result<()> {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|f| truncate(&cell(r, *f), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, f)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column_header(*f).len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .map(|f| column_header(*f).to_string())
        .collect();
    write_row(out, &header, &widths)?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            line.push_str(cell);
        } else {
            line.push_str(&format!("{:<width$}  ", cell, width = width));
        }
    }
    writeln!(out, "{}", line.trim_end())
}

/// Compact byte count: `512B`, `6.0M`, ...
pub fn bytes_to_human(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1}M", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1}G", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Seconds back to the utility's `H:MM:SS` form.
pub fn format_cpu_time(secs: u64) -> String {
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
