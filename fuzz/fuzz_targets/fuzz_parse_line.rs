//! Fuzz target for CSV row decoding.
//!
//! Every mode's schema must accept arbitrary text without panicking and
//! always produce exactly one record.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pl_core::collect::{parse_line, QueryMode, Schema};

#[derive(Debug, Arbitrary)]
enum Mode {
    Default,
    Verbose,
    Apps,
    AppsVerbose,
    Modules,
    Services,
}

impl From<Mode> for QueryMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Default => QueryMode::Default,
            Mode::Verbose => QueryMode::Verbose,
            Mode::Apps => QueryMode::Apps,
            Mode::AppsVerbose => QueryMode::AppsVerbose,
            Mode::Modules => QueryMode::Modules,
            Mode::Services => QueryMode::Services,
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    mode: Mode,
    line: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let schema = Schema::for_mode(input.mode.into());
    let row = parse_line(input.line, &schema);
    // Issues are only ever reported, never fatal.
    let _ = row.is_clean();
});
