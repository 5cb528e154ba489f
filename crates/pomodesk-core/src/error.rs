//! Core error types for pomodesk-core.
//!
//! Every fallible operation in the library reports through [`CoreError`].
//! None of these are fatal to the host: engine-level failures degrade to a
//! safe default state, and callers decide whether to surface the rest.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomodesk-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A duration supplied to `set_config` was not a positive number of minutes.
    #[error("Invalid config: '{field}' must be a positive number of minutes (got {value})")]
    InvalidConfig { field: &'static str, value: i64 },

    /// An unrecognised mode key. Callers should substitute `Focus`.
    #[error("Invalid mode: '{0}'")]
    InvalidMode(String),

    /// Persisted engine data failed structural validation.
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
