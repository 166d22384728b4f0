//! Core error types for studypomo-core.
//!
//! Errors are split by the boundary that produces them. Settings errors are
//! surfaced to the caller; notification and audio errors are logged and
//! swallowed by the session runner so they never reach timer state.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studypomo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings validation or persistence errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// OS notification errors
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Audio playback errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by [`crate::settings::SettingsStore`].
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The draft was rejected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote store could not be reached or refused the request.
    #[error("Failed to persist settings: {0}")]
    Gateway(#[from] GatewayError),
}

/// Errors from the remote settings store.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Settings service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Base URL could not be joined with the resource path
    #[error("Invalid settings URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body did not match the settings record shape
    #[error("Malformed settings response: {0}")]
    Malformed(String),

    /// Created/updated record came back without an id
    #[error("Settings record has no id")]
    MissingId,

    /// Service not reachable for another reason (used by offline gateways)
    #[error("Settings service unavailable: {0}")]
    Unavailable(String),
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

/// Validation errors.
///
/// The `Display` output is meant to be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A numeric setting is outside its allowed range
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },
}

/// OS notification service errors.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// The notification backend rejected the request
    #[error("Notification service failed: {0}")]
    Service(String),

    /// The backend needs a runtime or platform feature that is missing
    #[error("Notifications unsupported: {0}")]
    Unsupported(String),
}

/// Audio subsystem errors.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No usable output device
    #[error("Failed to open audio output: {0}")]
    Output(String),

    /// Alarm sound could not be read
    #[error("Failed to load alarm sound from {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// Alarm sound could not be decoded
    #[error("Failed to decode alarm sound: {0}")]
    Decode(String),
}

/// The session runtime has stopped and no longer accepts requests.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("session has shut down")]
pub struct SessionClosed;

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
