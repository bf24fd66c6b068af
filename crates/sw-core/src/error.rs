//! Error types for sw-core

use thiserror::Error;

/// Core error type for Stepwise
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: IO error
    #[error("[E003] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E004: IO error with file path context
    #[error("[E004] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E005: YAML parse error
    #[error("[E005] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// E101: A migration with this name already exists
    #[error("[E101] Migration '{name}' already exists: {path}")]
    DuplicateName { name: String, path: String },

    /// E102: Migration file could not be written
    #[error("[E102] Failed to create migration file '{path}': {source}")]
    WriteError {
        path: String,
        source: std::io::Error,
    },

    /// E103: Migration name cannot be used in a file name
    #[error("[E103] Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// E104: Generated id is already taken by another migration file
    #[error("[E104] Migration id {id} is already used by {path}")]
    DuplicateId { id: String, path: String },

    /// E105: Value is not a 14-digit migration id
    #[error("[E105] Invalid migration id '{value}': expected 14 digits (YYYYMMDDHHMMSS)")]
    InvalidMigrationId { value: String },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
