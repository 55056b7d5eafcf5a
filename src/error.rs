//! Error types for fireworks-chat

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`FireworksError`]
pub type Result<T> = std::result::Result<T, FireworksError>;

/// Broad classification of a [`FireworksError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unusable configuration, raised before any network call
    Configuration,
    /// Malformed caller input, raised before any network call
    Validation,
    /// Failure reported by the remote service or the network layer
    Transport,
}

/// Main error type for fireworks-chat
#[derive(Debug, Error)]
pub enum FireworksError {
    /// No API key was passed and none was found in the environment
    #[error("Missing API key: pass a token or set the {env_var} environment variable")]
    MissingApiKey { env_var: &'static str },

    /// Configuration parse error
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Configuration value that cannot be used as-is
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not available for the model's capability
    #[error("Model {model} does not support {operation}")]
    UnsupportedOperation { model: String, operation: &'static str },

    /// Non-success HTTP status from the inference API
    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed streaming payload
    #[error("Stream error: {0}")]
    Stream(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FireworksError {
    /// Classify this error as configuration, validation or transport
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingApiKey { .. } | Self::ConfigParse { .. } | Self::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
            Self::InvalidInput(_) | Self::UnsupportedOperation { .. } => ErrorKind::Validation,
            Self::Api { .. } | Self::Http(_) | Self::Stream(_) | Self::Json(_) | Self::Io(_) => {
                ErrorKind::Transport
            }
        }
    }

    /// Shorthand for `kind() == ErrorKind::Transport`
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}
