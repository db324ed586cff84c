//! Process query orchestration.
//!
//! Launches the listing utility, drains its stdout line by line, decodes
//! data rows against the schema resolved for the query, and reaps the child.
//!
//! The public lookups (`query`, `find_by_id`, `find_by_name`) never fail:
//! launch errors, nonzero exits, stream errors, and timeouts all collapse to
//! an empty result and a `warn!` log. The `try_*` variants return the
//! underlying [`QueryError`] and the query metadata.
//!
//! Lines end at `\n`, `\r\n` or a lone `\r`.

use super::command::{build_args, redacted_args};
use super::options::QueryOptions;
use super::parser::{is_data_line, parse_line};
use super::schema::Schema;
use super::types::{ProcessRecord, QueryMetadata, QueryOutput};
use crate::logging::{event_names, Stage};
use chrono::Utc;
use pl_common::ProcessId;
use pl_config::{TaskListSettings, DEFAULT_PROGRAM};
use std::borrow::Cow;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, info_span, warn, Instrument};

/// Stderr is kept for error messages only; anything past this is dropped.
const MAX_STDERR_BYTES: usize = 4096;

/// Errors that can occur while running a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error reading utility output: {0}")]
    Io(#[from] io::Error),

    #[error("utility exited with status {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("utility timed out after {0:?}")]
    Timeout(Duration),

    #[error("utility stdout was not captured")]
    MissingStdout,
}

/// How the utility is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListConfig {
    /// Program name or path.
    pub program: String,

    /// Upper bound on one query, including process startup. `None` waits
    /// for the stream to close however long that takes.
    pub timeout: Option<Duration>,
}

impl Default for TaskListConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            timeout: None,
        }
    }
}

impl TaskListConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &TaskListSettings) -> Self {
        Self {
            program: settings.program.clone(),
            timeout: settings.timeout(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Rows decoded from one output stream.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub records: Vec<ProcessRecord>,
    pub warnings: Vec<String>,
    pub lines_read: usize,
    pub lines_skipped: usize,
}

impl Collected {
    fn push_line(&mut self, line: &str, schema: &Schema) {
        self.lines_read += 1;
        if !is_data_line(line) {
            self.lines_skipped += 1;
            return;
        }

        let row = parse_line(line, schema);
        for issue in &row.issues {
            debug!(
                event = event_names::QUERY_ROW_ISSUE,
                stage = %Stage::Parse,
                line = self.lines_read,
                %issue,
                "degraded row"
            );
            self.warnings.push(format!("line {}: {}", self.lines_read, issue));
        }
        self.records.push(row.record);
    }
}

/// Drop the `\n` terminator and a preceding `\r`.
fn strip_terminator(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

/// Text of one line, replacing invalid UTF-8 rather than failing.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(raw)
}

/// Drain `reader` to EOF, decoding every data row against `schema`.
///
/// Lines that do not start with a quote (headers, separators, `INFO:`
/// messages, blank lines) are counted and skipped.
pub async fn collect_records<R>(mut reader: R, schema: &Schema) -> io::Result<Collected>
where
    R: AsyncBufRead + Unpin,
{
    let mut collected = Collected::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        // Any `\r` left after the terminator is a line break of its own.
        for line in strip_terminator(&buf).split(|&b| b == b'\r') {
            collected.push_line(&decode_line(line), schema);
        }
    }

    Ok(collected)
}

async fn read_stderr(stderr: Option<ChildStderr>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut stderr) = stderr {
        // Read to EOF so the child never blocks on a full pipe; keep a prefix.
        if stderr.read_to_end(&mut buf).await.is_err() {
            buf.clear();
        }
        buf.truncate(MAX_STDERR_BYTES);
    }
    buf
}

/// Drain both pipes concurrently, then reap the child.
async fn drain(
    child: &mut Child,
    stdout: ChildStdout,
    stderr: Option<ChildStderr>,
    schema: &Schema,
) -> Result<(Collected, Vec<u8>, ExitStatus), QueryError> {
    let (collected, stderr_bytes) = tokio::join!(
        collect_records(BufReader::new(stdout), schema),
        read_stderr(stderr)
    );
    // Reap before surfacing a stream error so no zombie is left behind.
    let status = child.wait().await?;
    Ok((collected?, stderr_bytes, status))
}

/// Handle to the listing utility.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    config: TaskListConfig,
}

impl TaskList {
    pub fn new(config: TaskListConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TaskListConfig {
        &self.config
    }

    /// Run one query and report exactly what happened.
    pub async fn try_query(&self, options: &QueryOptions) -> Result<QueryOutput, QueryError> {
        let schema = Schema::resolve(options);
        let span = info_span!(
            "query",
            stage = %Stage::Query,
            mode = %schema.mode(),
            system = options.system.as_deref().filter(|s| !s.is_empty()).unwrap_or("local"),
        );
        self.run(options, schema).instrument(span).await
    }

    async fn run(&self, options: &QueryOptions, schema: Schema) -> Result<QueryOutput, QueryError> {
        let args = build_args(options);
        let started_at = Utc::now();
        let start = Instant::now();

        debug!(
            event = event_names::QUERY_STARTED,
            program = %self.config.program,
            args = ?redacted_args(options),
            "launching process listing"
        );

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| QueryError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        debug!(event = event_names::QUERY_SPAWNED, child_pid = ?child.id(), "utility started");

        let stdout = child.stdout.take().ok_or(QueryError::MissingStdout)?;
        let stderr = child.stderr.take();

        let drained = match self.config.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, drain(&mut child, stdout, stderr, &schema)).await
                {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            event = event_names::QUERY_TIMEOUT,
                            timeout_ms = limit.as_millis() as u64,
                            "killing unresponsive utility"
                        );
                        // kill() also waits, so the child is reaped here.
                        let _ = child.kill().await;
                        return Err(QueryError::Timeout(limit));
                    }
                }
            }
            None => drain(&mut child, stdout, stderr, &schema).await,
        };
        let (collected, stderr_bytes, status) = drained?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes).trim().to_string();
            return Err(QueryError::NonZeroExit {
                code: status.code().unwrap_or(-1),
                stderr,
            });
        }

        let metadata = QueryMetadata {
            program: self.config.program.clone(),
            mode: schema.mode().to_string(),
            system: options.system.clone().filter(|s| !s.is_empty()),
            started_at: started_at.to_rfc3339(),
            duration_ms: start.elapsed().as_millis() as u64,
            exit_code: status.code(),
            lines_read: collected.lines_read,
            lines_skipped: collected.lines_skipped,
            warnings: collected.warnings,
        };

        debug!(
            event = event_names::QUERY_FINISHED,
            records = collected.records.len(),
            lines_read = metadata.lines_read,
            lines_skipped = metadata.lines_skipped,
            warnings = metadata.warnings.len(),
            duration_ms = metadata.duration_ms,
            "process listing complete"
        );

        Ok(QueryOutput {
            records: collected.records,
            metadata,
        })
    }

    /// Look up one process by ID, keeping at most the first row.
    pub async fn try_find_by_id(
        &self,
        pid: impl Into<ProcessId>,
        options: &QueryOptions,
    ) -> Result<QueryOutput, QueryError> {
        let mut output = self.try_query(&with_id_filter(options, pid.into())).await?;
        output.records.truncate(1);
        Ok(output)
    }

    /// Look up processes by image name.
    pub async fn try_find_by_name(
        &self,
        name: &str,
        options: &QueryOptions,
    ) -> Result<QueryOutput, QueryError> {
        self.try_query(&with_name_filter(options, name)).await
    }

    /// List processes. Failures yield an empty list.
    pub async fn query(&self, options: &QueryOptions) -> Vec<ProcessRecord> {
        self.records_or_empty(self.try_query(options).await)
    }

    /// Look up one process by ID. Adds `PID eq <pid>` to the caller's filters.
    pub async fn find_by_id(
        &self,
        pid: impl Into<ProcessId>,
        options: &QueryOptions,
    ) -> Option<ProcessRecord> {
        let records = self.records_or_empty(self.try_find_by_id(pid, options).await);
        records.into_iter().next()
    }

    /// All processes with the given image name, in output order. Adds
    /// `IMAGENAME eq <name>` to the caller's filters.
    pub async fn find_by_name(&self, name: &str, options: &QueryOptions) -> Vec<ProcessRecord> {
        self.records_or_empty(self.try_find_by_name(name, options).await)
    }

    fn records_or_empty(&self, result: Result<QueryOutput, QueryError>) -> Vec<ProcessRecord> {
        match result {
            Ok(output) => output.records,
            Err(err) => {
                warn!(
                    event = event_names::QUERY_FAILED,
                    program = %self.config.program,
                    error = %err,
                    "process query failed; returning no processes"
                );
                Vec::new()
            }
        }
    }
}

/// `options` plus the `PID eq <pid>` lookup filter, after the caller's own.
pub fn with_id_filter(options: &QueryOptions, pid: ProcessId) -> QueryOptions {
    options.clone().with_filter(format!("PID eq {}", pid))
}

/// `options` plus the `IMAGENAME eq <name>` lookup filter, after the
/// caller's own.
pub fn with_name_filter(options: &QueryOptions, name: &str) -> QueryOptions {
    options.clone().with_filter(format!("IMAGENAME eq {}", name))
}

/// List processes with the default utility.
pub async fn get_processes(options: &QueryOptions) -> Vec<ProcessRecord> {
    TaskList::default().query(options).await
}

/// Look up one process by ID with the default utility.
pub async fn get_process_by_id(
    pid: impl Into<ProcessId>,
    options: &QueryOptions,
) -> Option<ProcessRecord> {
    TaskList::default().find_by_id(pid, options).await
}

/// Look up processes by image name with the default utility.
pub async fn get_processes_by_name(name: &str, options: &QueryOptions) -> Vec<ProcessRecord> {
    TaskList::default().find_by_name(name, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::schema::QueryMode;

    const FIXTURE: &[u8] = b"\r\n\
Image Name                     PID Session Name        Session#    Mem Usage\r\n\
========================= ======== ================ =========== ============\r\n\
\"System Idle Process\",\"0\",\"Services\",\"0\",\"8 K\"\r\n\
\"notepad.exe\",\"1234\",\"Console\",\"1\",\"6,000 K\"\r\n\
\"notepad.exe\",\"5678\",\"Console\",\"1\",\"1,234 K\"";

    #[tokio::test]
    async fn test_collect_records_skips_non_data_lines() {
        let schema = Schema::for_mode(QueryMode::Default);
        let collected = collect_records(FIXTURE, &schema).await.unwrap();
        assert_eq!(collected.records.len(), 3);
        assert_eq!(collected.lines_read, 6);
        assert_eq!(collected.lines_skipped, 3);
        assert!(collected.warnings.is_empty());

        let notepad = &collected.records[1];
        assert_eq!(notepad.name, "notepad.exe");
        assert_eq!(notepad.pid, ProcessId(1234));
        assert_eq!(notepad.session_name.as_deref(), Some("Console"));
        assert_eq!(notepad.session_number, Some(1));
        assert_eq!(notepad.mem_usage, Some(6_144_000));
        assert_eq!(collected.records[2].mem_usage, Some(1_263_616));
    }

    #[tokio::test]
    async fn test_collect_records_empty_stream() {
        let schema = Schema::for_mode(QueryMode::Default);
        let collected = collect_records(&b""[..], &schema).await.unwrap();
        assert!(collected.records.is_empty());
        assert_eq!(collected.lines_read, 0);
    }

    #[tokio::test]
    async fn test_collect_records_info_message_only() {
        let schema = Schema::for_mode(QueryMode::Default);
        let input = b"INFO: No tasks are running which match the specified criteria.\r\n";
        let collected = collect_records(&input[..], &schema).await.unwrap();
        assert!(collected.records.is_empty());
        assert_eq!(collected.lines_skipped, 1);
    }

    #[tokio::test]
    async fn test_collect_records_lossy_utf8_and_warnings() {
        let schema = Schema::for_mode(QueryMode::Verbose);
        let mut input = Vec::new();
        input.extend_from_slice(
            b"\"app.exe\",\"9\",\"Console\",\"1\",\"10 K\",\"Running\",\"u\",\"0:00:07\",\"caf",
        );
        input.push(0xE9);
        input.extend_from_slice(b"\"\n\"bad.exe\",\"x\"\n");

        let collected = collect_records(&input[..], &schema).await.unwrap();
        assert_eq!(collected.records.len(), 2);
        assert_eq!(
            collected.records[0].window_title.as_deref(),
            Some("caf\u{FFFD}")
        );
        assert_eq!(collected.records[0].cpu_time, Some(7));
        assert_eq!(collected.records[1].pid, ProcessId(0));
        assert_eq!(collected.warnings.len(), 2);
        assert!(collected.warnings.iter().all(|w| w.starts_with("line 2:")));
    }

    #[test]
    fn test_strip_terminator_once() {
        assert_eq!(strip_terminator(b"abc\r\n"), b"abc");
        assert_eq!(strip_terminator(b"abc\n"), b"abc");
        assert_eq!(strip_terminator(b"abc"), b"abc");
        assert_eq!(strip_terminator(b"abc\r\r\n"), b"abc\r");
    }

    #[tokio::test]
    async fn test_collect_records_lone_cr_ends_a_line() {
        let schema = Schema::for_mode(QueryMode::Default);
        let input = b"\"a.exe\",\"1\",\"S\",\"0\",\"4 K\"\r\
\"b.exe\",\"2\",\"S\",\"0\",\"8 K\"\r\r\n\
\"c.exe\",\"3\",\"S\",\"0\",\"1 K\"\r";
        let collected = collect_records(&input[..], &schema).await.unwrap();

        let pids: Vec<u32> = collected.records.iter().map(|r| r.pid.0).collect();
        assert_eq!(pids, vec![1, 2, 3]);
        assert_eq!(collected.records[1].mem_usage, Some(8 * 1024));
        // The blank line between `\r` and `\r\n`.
        assert_eq!(collected.lines_read, 4);
        assert_eq!(collected.lines_skipped, 1);
        assert!(collected.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_try_lookups_surface_spawn_errors() {
        let list = TaskList::new(
            TaskListConfig::new().with_program("/nonexistent/definitely-not-tasklist"),
        );
        let err = list
            .try_find_by_id(4u32, &QueryOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Spawn { .. }));
        assert!(list
            .try_find_by_name("x.exe", &QueryOptions::new())
            .await
            .is_err());
    }

    #[test]
    fn test_lookup_filters_are_appended() {
        let options = QueryOptions::new().with_filter("STATUS eq RUNNING");
        let by_id = with_id_filter(&options, ProcessId(42));
        assert_eq!(by_id.filters, vec!["STATUS eq RUNNING", "PID eq 42"]);

        let by_name = with_name_filter(&options, "notepad.exe");
        assert_eq!(
            by_name.filters,
            vec!["STATUS eq RUNNING", "IMAGENAME eq notepad.exe"]
        );
        assert_eq!(options.filters.len(), 1, "caller options untouched");
    }

    #[test]
    fn test_config_from_settings() {
        let settings = TaskListSettings {
            program: "/opt/tasklist".to_string(),
            timeout_secs: Some(3),
        };
        let config = TaskListConfig::from_settings(&settings);
        assert_eq!(config.program, "/opt/tasklist");
        assert_eq!(config.timeout, Some(Duration::from_secs(3)));
        assert_eq!(TaskListConfig::default().program, DEFAULT_PROGRAM);
        assert_eq!(TaskListConfig::default().timeout, None);
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error_and_empty_query() {
        let list = TaskList::new(
            TaskListConfig::new().with_program("/nonexistent/definitely-not-tasklist"),
        );
        let err = list.try_query(&QueryOptions::new()).await.unwrap_err();
        assert!(matches!(err, QueryError::Spawn { .. }), "got {err:?}");
        assert!(list.query(&QueryOptions::new()).await.is_empty());
        assert!(list.find_by_id(4u32, &QueryOptions::new()).await.is_none());
    }
}
