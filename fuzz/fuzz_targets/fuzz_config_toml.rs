//! Fuzz target for config.toml parsing and validation.
//!
//! Parsing and validation should never panic, only return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pl_config::{validate_settings, Settings};

fuzz_target!(|data: &str| {
    if let Ok(settings) = Settings::parse_toml(data) {
        let _ = validate_settings(&settings);
    }
});
