//! Configuration validation errors and semantic validation.

use crate::settings::{ModulesSetting, Settings};
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
        }
    }
}

/// Validate settings semantically.
///
/// Hard errors reject the file. Option combinations that the query builder
/// would silently drop (a username without a system) come back as warnings.
pub fn validate_settings(settings: &Settings) -> ValidationResult<Vec<String>> {
    if settings.tasklist.program.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "tasklist.program".to_string(),
            message: "must not be empty".to_string(),
        });
    }

    if settings.tasklist.timeout_secs == Some(0) {
        return Err(ValidationError::InvalidValue {
            field: "tasklist.timeout_secs".to_string(),
            message: "must be positive (omit it to disable the timeout)".to_string(),
        });
    }

    for (idx, filter) in settings.query.filters.iter().enumerate() {
        if filter.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("query.filters[{}]", idx),
                message: "filter expression must not be empty".to_string(),
            });
        }
    }

    let mut warnings = Vec::new();
    let query = &settings.query;
    let empty = |value: &Option<String>| value.as_deref().is_some_and(str::is_empty);

    if empty(&query.system) {
        warnings.push("query.system is empty and is ignored".to_string());
    }
    if empty(&query.username) {
        warnings.push("query.username is empty and is ignored".to_string());
    }
    if matches!(&query.modules, Some(ModulesSetting::Name(name)) if name.is_empty()) {
        warnings.push("query.modules names no module; use `modules = true` for all".to_string());
    }

    let has_system = query.system.as_deref().is_some_and(|v| !v.is_empty());
    if query.username.as_deref().is_some_and(|v| !v.is_empty()) && !has_system {
        warnings.push("query.username is ignored without query.system".to_string());
    }
    if query.modules_requested() && (query.services || query.apps || query.verbose) {
        warnings.push(
            "query.modules takes precedence; services/apps/verbose are ignored".to_string(),
        );
    } else if query.services && (query.apps || query.verbose) {
        warnings.push("query.services takes precedence; apps/verbose are ignored".to_string());
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let warnings = validate_settings(&Settings::default()).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_empty_program_rejected() {
        let mut settings = Settings::default();
        settings.tasklist.program = "  ".to_string();
        let err = validate_settings(&settings).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidValue { ref field, .. } if field == "tasklist.program"
        ));
        assert_eq!(err.code(), 65);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut settings = Settings::default();
        settings.tasklist.timeout_secs = Some(0);
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_blank_filter_rejected() {
        let mut settings = Settings::default();
        settings.query.filters = vec!["PID eq 4".to_string(), "".to_string()];
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("query.filters[1]"));
    }

    #[test]
    fn test_username_without_system_warns() {
        let mut settings = Settings::default();
        settings.query.username = Some("admin".to_string());
        let warnings = validate_settings(&settings).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("username"));
    }

    #[test]
    fn test_empty_query_values_warn() {
        let settings = Settings::parse_toml(
            "[query]\nsystem = \"\"\nusername = \"\"\nmodules = \"\"\nservices = true\n",
        )
        .unwrap();
        assert!(!settings.query.modules_requested());

        let warnings = validate_settings(&settings).unwrap();
        assert_eq!(warnings.len(), 3, "warnings: {:?}", warnings);
        assert!(warnings[0].contains("query.system is empty"));
        assert!(warnings[1].contains("query.username is empty"));
        assert!(warnings[2].contains("query.modules names no module"));
    }

    #[test]
    fn test_mode_precedence_warnings() {
        let mut settings = Settings::default();
        settings.query.modules = Some(ModulesSetting::Flag(true));
        settings.query.services = true;
        let warnings = validate_settings(&settings).unwrap();
        assert!(warnings[0].contains("modules takes precedence"));

        let mut settings = Settings::default();
        settings.query.services = true;
        settings.query.verbose = true;
        let warnings = validate_settings(&settings).unwrap();
        assert!(warnings[0].contains("services takes precedence"));
    }
}
