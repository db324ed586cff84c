//! Process collection via the listing utility.
//!
//! This module turns query options into a utility invocation and the
//! utility's CSV output into typed records:
//! - Schema resolution: which columns a query produces, in which order
//! - Line parsing: one quoted-CSV row into a [`ProcessRecord`]
//! - Command building: options into an argument vector
//! - Query orchestration: spawn, drain, decode, reap

mod command;
mod options;
mod parser;
mod query;
mod schema;
mod types;

pub use command::{build_args, redacted_args, BASE_ARGS};
pub use options::{ModulesOption, QueryOptions};
pub use parser::{
    is_data_line, parse_duration, parse_integer, parse_line, parse_list, parse_memory, split_row,
    ParsedRow, RowIssue,
};
pub use query::{
    collect_records, get_process_by_id, get_processes, get_processes_by_name, with_id_filter,
    with_name_filter, Collected, QueryError, TaskList, TaskListConfig,
};
pub use schema::{FieldKind, FieldName, QueryMode, Schema};
pub use types::{ProcessRecord, ProcessStatus, QueryMetadata, QueryOutput};
