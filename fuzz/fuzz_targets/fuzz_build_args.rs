//! Fuzz target for argument building and redaction.
//!
//! The logged form of an argument vector must never contain the password.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pl_core::collect::{build_args, redacted_args, QueryOptions};

#[derive(Debug, Arbitrary)]
struct Input {
    system: Option<String>,
    username: Option<String>,
    password: Option<String>,
    modules: Option<Option<String>>,
    services: bool,
    apps: bool,
    verbose: bool,
    filters: Vec<String>,
}

fuzz_target!(|input: Input| {
    let mut options = QueryOptions::new()
        .with_services(input.services)
        .with_apps(input.apps)
        .with_verbose(input.verbose);
    if let Some(system) = input.system {
        options = options.with_system(system);
    }
    if let Some(username) = input.username {
        options = options.with_username(username);
    }
    match input.modules {
        Some(Some(name)) => options = options.with_modules(name),
        Some(None) => options = options.with_modules(true),
        None => {}
    }
    for filter in input.filters {
        options = options.with_filter(filter);
    }

    let Some(password) = input.password else {
        let _ = build_args(&options);
        return;
    };
    options = options.with_password(password.clone());

    let args = build_args(&options);
    let redacted = redacted_args(&options);
    assert_eq!(args.len(), redacted.len());
    // The password occupies the same slot in both vectors, if it is emitted at all.
    for (arg, logged) in args.iter().zip(&redacted) {
        if arg != logged {
            assert_eq!(arg, &password);
            assert_eq!(logged, "***");
        }
    }
});
