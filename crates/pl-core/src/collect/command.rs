//! Argument vector construction for the listing utility.

use super::options::QueryOptions;

/// Arguments that select machine-readable output with no header row.
pub const BASE_ARGS: &[&str] = &["/fo", "csv", "/nh"];

/// Placeholder logged in place of a password.
pub const REDACTED: &str = "***";

/// Build the utility's argument vector.
///
/// Order is fixed: output format, remote triple, one mode switch group, then
/// one `/fi` pair per filter. Credentials are only emitted when the option
/// they depend on is present (`/u` needs `/s`, `/p` needs `/u`). Empty
/// strings count as absent.
pub fn build_args(options: &QueryOptions) -> Vec<String> {
    let mut args: Vec<String> = BASE_ARGS.iter().map(|s| s.to_string()).collect();

    if let Some(system) = supplied(&options.system) {
        args.push("/s".to_string());
        args.push(system.to_string());
        if let Some(username) = supplied(&options.username) {
            args.push("/u".to_string());
            args.push(username.to_string());
            if let Some(password) = supplied(&options.password) {
                args.push("/p".to_string());
                args.push(password.to_string());
            }
        }
    }

    if options.modules.is_requested() {
        args.push("/m".to_string());
        if let Some(name) = options.modules.module_name() {
            args.push(name.to_string());
        }
    } else if options.services {
        args.push("/svc".to_string());
    } else {
        if options.apps {
            args.push("/apps".to_string());
        }
        if options.verbose {
            args.push("/v".to_string());
        }
    }

    for filter in &options.filters {
        args.push("/fi".to_string());
        args.push(filter.clone());
    }

    args
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Argument vector safe to log: built from `options` with the password
/// swapped for a placeholder, so other values cannot shift the mask.
pub fn redacted_args(options: &QueryOptions) -> Vec<String> {
    if supplied(&options.password).is_none() {
        return build_args(options);
    }
    let mut masked = options.clone();
    masked.password = Some(REDACTED.to_string());
    build_args(&masked)
}
