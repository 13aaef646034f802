//! Error types for Kino Vimeo

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for tech operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error reported by the remote player, surfaced verbatim
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{name} ({method}): {message}")]
pub struct RemoteError {
    /// Error name, e.g. `PasswordError` or `NotAllowedError`
    pub name: String,
    /// Remote method that failed, e.g. `play`
    #[serde(default)]
    pub method: String,
    /// Human readable message
    #[serde(default)]
    pub message: String,
}

impl RemoteError {
    pub fn new(
        name: impl Into<String>,
        method: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            message: message.into(),
        }
    }

    /// The client library never finished loading
    pub fn library_load(message: impl Into<String>) -> Self {
        Self::new("LibraryLoadError", "load", message)
    }

    /// The player factory could not build a remote player
    pub fn construction(message: impl Into<String>) -> Self {
        Self::new("PlayerConstructionError", "create", message)
    }
}

/// Error as exposed to the host framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechError {
    /// `"<name> <method>"`
    pub code: String,
    pub message: String,
}

impl From<&RemoteError> for TechError {
    fn from(err: &RemoteError) -> Self {
        Self {
            code: format!("{} {}", err.name, err.method),
            message: err.message.clone(),
        }
    }
}

/// Tech error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Remote player error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Failed to construct remote player: {0}")]
    PlayerConstruction(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed event payload: {0}")]
    InvalidPayload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if retrying the operation may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Remote(_) | Error::PlayerConstruction(_))
    }

    /// Returns the error code for logs and diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Remote(_) => "REMOTE",
            Error::PlayerConstruction(_) => "PLAYER_CONSTRUCTION",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::InvalidPayload(_) => "INVALID_PAYLOAD",
            Error::Json(_) => "JSON",
        }
    }
}

impl From<Error> for RemoteError {
    fn from(err: Error) -> Self {
        match err {
            Error::Remote(remote) => remote,
            Error::PlayerConstruction(msg) => RemoteError::construction(msg),
            other => RemoteError::new("TechError", other.error_code(), other.to_string()),
        }
    }
}
