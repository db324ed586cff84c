//! process_list common types and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - Process identity type
//! - Common error types
//! - Output format selection

pub mod error;
pub mod id;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use id::ProcessId;
pub use output::OutputFormat;
