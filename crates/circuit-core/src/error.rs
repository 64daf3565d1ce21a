//! Core error types for circuit-core.
//!
//! The playback path itself never fails (invalid commands are no-ops and
//! audio problems are logged), so these errors surface from configuration,
//! definition loading and audio device setup.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for circuit-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Audio output errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization errors
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
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

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// File extension we cannot parse
    #[error("unsupported timer file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Named timer missing from the store
    #[error("timer not found: {0}")]
    NotFound(String),
}

/// Audio output errors.
///
/// These never propagate out of the tone scheduler; they are logged there.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No output device could be opened
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Device accepted the stream but playback failed
    #[error("playback failed: {0}")]
    PlaybackFailed(String),

    /// The audio thread has gone away
    #[error("audio engine disconnected")]
    Disconnected,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
