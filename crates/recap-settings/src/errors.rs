//! Settings error type.

use thiserror::Error;

/// Result alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Errors produced while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file contained invalid JSON or an unexpected shape.
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings are structurally valid but semantically wrong.
    #[error("invalid settings: {reason}")]
    Invalid {
        /// What was rejected.
        reason: String,
    },
}

impl SettingsError {
    /// Create an `Invalid` error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}
