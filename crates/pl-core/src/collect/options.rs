//! Query options: target host, credentials, output mode, and filters.

use pl_config::{ModulesSetting, QueryDefaults};
use serde::{Deserialize, Serialize};

/// Module listing request: off, all modules, or only processes that loaded
/// one named module. An empty module name means not requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ModulesSetting", into = "ModulesSetting")]
pub enum ModulesOption {
    #[default]
    Off,
    All,
    Named(String),
}

impl ModulesOption {
    pub fn is_requested(&self) -> bool {
        match self {
            ModulesOption::Off => false,
            ModulesOption::All => true,
            ModulesOption::Named(name) => !name.is_empty(),
        }
    }

    /// Module name passed after `/m`, if any.
    pub fn module_name(&self) -> Option<&str> {
        match self {
            ModulesOption::Named(name) if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

impl From<bool> for ModulesOption {
    fn from(enabled: bool) -> Self {
        if enabled {
            ModulesOption::All
        } else {
            ModulesOption::Off
        }
    }
}

impl From<&str> for ModulesOption {
    fn from(name: &str) -> Self {
        name.to_string().into()
    }
}

impl From<String> for ModulesOption {
    fn from(name: String) -> Self {
        if name.is_empty() {
            ModulesOption::Off
        } else {
            ModulesOption::Named(name)
        }
    }
}

impl From<ModulesSetting> for ModulesOption {
    fn from(setting: ModulesSetting) -> Self {
        match setting {
            ModulesSetting::Flag(enabled) => enabled.into(),
            ModulesSetting::Name(name) => name.into(),
        }
    }
}

impl From<ModulesOption> for ModulesSetting {
    fn from(option: ModulesOption) -> Self {
        match option {
            ModulesOption::Off => ModulesSetting::Flag(false),
            ModulesOption::All => ModulesSetting::Flag(true),
            ModulesOption::Named(name) => ModulesSetting::Name(name),
        }
    }
}

/// Options for one process query.
///
/// Mode flags are evaluated with precedence modules > services > apps/verbose,
/// mirroring the utility's own mutually exclusive switches. Combinations the
/// utility cannot honor (a password without a username, a username without a
/// system) are dropped when the command line is built, never rejected. An
/// empty string counts as not supplied.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Remote computer name or IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Account on the remote computer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for `username`. Never serialized.
    #[serde(skip_serializing)]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "is_modules_off")]
    pub modules: ModulesOption,

    pub services: bool,
    pub apps: bool,
    pub verbose: bool,

    /// Raw predicates passed through as `/fi <expr>`, unmodified.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
}

fn is_modules_off(modules: &ModulesOption) -> bool {
    !modules.is_requested()
}

impl std::fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOptions")
            .field("system", &self.system)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("modules", &self.modules)
            .field("services", &self.services)
            .field("apps", &self.apps)
            .field("verbose", &self.verbose)
            .field("filters", &self.filters)
            .finish()
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed options from the `[query]` section of the config file.
    pub fn from_defaults(defaults: &QueryDefaults) -> Self {
        Self {
            system: defaults.system.clone(),
            username: defaults.username.clone(),
            password: None,
            modules: defaults
                .modules
                .clone()
                .map(ModulesOption::from)
                .unwrap_or_default(),
            services: defaults.services,
            apps: defaults.apps,
            verbose: defaults.verbose,
            filters: defaults.filters.clone(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_modules(mut self, modules: impl Into<ModulesOption>) -> Self {
        self.modules = modules.into();
        self
    }

    pub fn with_services(mut self, enabled: bool) -> Self {
        self.services = enabled;
        self
    }

    pub fn with_apps(mut self, enabled: bool) -> Self {
        self.apps = enabled;
        self
    }

    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Append one filter predicate, e.g. `"STATUS eq RUNNING"`.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }
}
