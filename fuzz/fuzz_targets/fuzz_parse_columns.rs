//! Fuzz target for the numeric column parsers.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pl_core::collect::{parse_duration, parse_integer, parse_memory};

fuzz_target!(|data: &str| {
    let _ = parse_integer(data);

    let (bytes, overflowed) = parse_memory(data);
    if !overflowed {
        assert_eq!(bytes % 1024, 0, "memory is whole kilobytes: {data:?}");
    }

    let _ = parse_duration(data);
});
