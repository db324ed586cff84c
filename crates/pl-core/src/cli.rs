//! Command-line query flags and their merge with config defaults.

use crate::collect::{ModulesOption, QueryOptions};
use clap::Args;
use pl_common::Error;

/// Query options accepted by every listing command.
#[derive(Args, Debug, Clone, Default)]
pub struct QueryFlags {
    /// Remote computer name or IP address
    #[arg(long, short = 's', global = true, value_name = "HOST")]
    pub system: Option<String>,

    /// User account on the remote computer (needs --system)
    #[arg(long, short = 'u', global = true, value_name = "USER")]
    pub username: Option<String>,

    /// Password for --username
    #[arg(
        long,
        short = 'p',
        global = true,
        env = "PL_PASSWORD",
        hide_env_values = true,
        value_name = "PASSWORD"
    )]
    pub password: Option<String>,

    /// List loaded modules; with NAME, only processes that loaded it
    #[arg(
        long,
        short = 'm',
        global = true,
        num_args = 0..=1,
        default_missing_value = "",
        value_name = "NAME"
    )]
    pub modules: Option<String>,

    /// List services hosted by each process
    #[arg(long, global = true)]
    pub services: bool,

    /// List store apps
    #[arg(long, global = true)]
    pub apps: bool,

    /// Include status, user, CPU time, and window title
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Filter predicate passed to the utility, e.g. "STATUS eq RUNNING" (repeatable)
    #[arg(long = "filter", global = true, value_name = "EXPR")]
    pub filters: Vec<String>,
}

impl QueryFlags {
    /// `--modules` alone means all modules; `--modules NAME` names one.
    pub fn modules_option(&self) -> Option<ModulesOption> {
        self.modules.as_deref().map(|name| {
            if name.is_empty() {
                ModulesOption::All
            } else {
                ModulesOption::from(name)
            }
        })
    }

    /// Reject values the utility would misread as a missing argument.
    pub fn validate(&self) -> Result<(), Error> {
        if self.filters.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::InvalidArgument("--filter must not be empty".to_string()));
        }
        for (flag, value) in [("--system", &self.system), ("--username", &self.username)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(Error::InvalidArgument(format!("{} must not be empty", flag)));
            }
        }
        Ok(())
    }

    /// Layer these flags over `base`. Values given on the command line
    /// replace config values; boolean switches can only turn modes on;
    /// filters are appended after the configured ones.
    pub fn apply(&self, base: QueryOptions) -> QueryOptions {
        let mut options = base;
        if let Some(system) = &self.system {
            options.system = Some(system.clone());
        }
        if let Some(username) = &self.username {
            options.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            options.password = Some(password.clone());
        }
        if let Some(modules) = self.modules_option() {
            options.modules = modules;
        }
        options.services |= self.services;
        options.apps |= self.apps;
        options.verbose |= self.verbose;
        options.filters.extend(self.filters.iter().cloned());
        options
    }
}
