//! Core error types for zumbazombie-core.
//!
//! The monitoring state machine itself never fails; errors only come from
//! the edges: configuration on disk, user-supplied values, and the
//! notification/background seams.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for zumbazombie-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Notification delivery failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// Background task registration or execution failed
    #[error("Background task '{task}' failed: {message}")]
    Background { task: String, message: String },

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
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Timer setting outside the fixed menu
    #[error("Invalid timer setting: {minutes} minutes (allowed: 5, 10, 15, 20, 25, 30)")]
    InvalidTimerSetting { minutes: u32 },

    /// Unrecognised user command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
