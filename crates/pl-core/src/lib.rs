//! process_list core library.
//!
//! Lists processes on a local or remote Windows machine by running
//! `tasklist.exe` and decoding its CSV output:
//! - Process collection (schema, parser, command builder, query)
//! - Exit codes for CLI operations
//! - CLI flag handling and output rendering
//! - Structured logging
//!
//! The binary entry point is in `main.rs`.
//!
//! ```no_run
//! use pl_core::collect::{QueryOptions, TaskList};
//!
//! # async fn demo() {
//! let list = TaskList::default();
//! let options = QueryOptions::new().with_verbose(true);
//! for process in list.find_by_name("notepad.exe", &options).await {
//!     println!("{} {}", process.pid, process.name);
//! }
//! # }
//! ```

pub mod cli;
pub mod collect;
pub mod exit_codes;
pub mod logging;
pub mod output;

pub use collect::{
    get_process_by_id, get_processes, get_processes_by_name, ProcessRecord, QueryOptions, TaskList,
    TaskListConfig,
};
