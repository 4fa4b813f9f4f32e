//! Core error types for toolbench-core.
//!
//! Errors fall into three user-facing groups: missing required input
//! (blocks a calculation), a malformed import file (aborts the import and
//! leaves state untouched), and storage/serialization failures. Nothing is
//! retried; every error ends the current action.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for toolbench-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Local storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Export/import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Validation errors raised before a calculation or mutation runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// One or more required form fields are empty or zero
    #[error("Please fill in the required fields: {}", .fields.join(", "))]
    MissingRequired { fields: Vec<String> },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Record not found
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Content exceeds a hard length limit
    #[error("{field} is {len} characters long, the limit is {limit}")]
    TooLong {
        field: String,
        len: usize,
        limit: usize,
    },
}

impl ValidationError {
    /// Shorthand for a single missing field.
    pub fn missing(field: &str) -> Self {
        ValidationError::MissingRequired {
            fields: vec![field.to_string()],
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Local storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Data directory could not be resolved or created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored blob exists but cannot be parsed
    #[error("Stored data at {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Failed to write a blob
    #[error("Failed to save {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Errors raised while reading an export file. State is never touched
/// when one of these is returned.
#[derive(Error, Debug)]
pub enum ImportError {
    /// File is not valid JSON or does not match the expected shape
    #[error("Malformed import file: {0}")]
    Malformed(String),

    /// Export belongs to a different tool
    #[error("Import file was exported by '{found}', expected '{expected}'")]
    WrongTool { expected: String, found: String },

    /// Export format is newer than this build understands
    #[error("Unsupported export version {found} (max supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_lists_every_field() {
        let err = ValidationError::MissingRequired {
            fields: vec!["current_rent".into(), "property_price".into()],
        };
        assert_eq!(
            err.to_string(),
            "Please fill in the required fields: current_rent, property_price"
        );
    }

    #[test]
    fn validation_converts_into_core_error() {
        let err: CoreError = ValidationError::missing("title").into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn wrong_tool_message_names_both_tools() {
        let err = ImportError::WrongTool {
            expected: "todo".into(),
            found: "calendar".into(),
        };
        assert!(err.to_string().contains("calendar"));
        assert!(err.to_string().contains("todo"));
    }
}
