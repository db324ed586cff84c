//! process_list configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for config.toml
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation

pub mod resolve;
pub mod settings;
pub mod validate;

pub use resolve::{resolve_config, ConfigPath, ConfigSource};
pub use settings::{ModulesSetting, QueryDefaults, Settings, TaskListSettings, DEFAULT_PROGRAM};
pub use validate::{validate_settings, ValidationError, ValidationResult};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment override for the listing utility.
pub const ENV_TASKLIST_BIN: &str = "PL_TASKLIST_BIN";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid config file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

/// Settings together with where they came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub settings: Settings,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
    /// Non-fatal findings from validation.
    pub warnings: Vec<String>,
}

/// Resolve, read, and validate the configuration.
///
/// A missing file is only an error when it was named explicitly on the
/// command line. `PL_TASKLIST_BIN` overrides `tasklist.program` last.
pub fn load_config(cli_path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let resolved = resolve_config(cli_path);

    let mut loaded = match resolved.path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound { path });
            }
            let settings = Settings::from_file(&path).map_err(|source| ConfigError::Invalid {
                path: path.clone(),
                source,
            })?;
            LoadedConfig {
                settings,
                path: Some(path),
                source: resolved.source,
                warnings: Vec::new(),
            }
        }
        None => LoadedConfig::default(),
    };

    if let Ok(program) = std::env::var(ENV_TASKLIST_BIN) {
        if !program.trim().is_empty() {
            loaded.settings.tasklist.program = program;
        }
    }

    let path_for_error = loaded.path.clone().unwrap_or_default();
    loaded.warnings =
        validate_settings(&loaded.settings).map_err(|source| ConfigError::Invalid {
            path: path_for_error,
            source,
        })?;

    Ok(loaded)
}
