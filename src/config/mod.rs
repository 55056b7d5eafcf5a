//! Configuration for fireworks-chat
//!
//! Credentials resolve in this order:
//! 1. An explicit token passed by the caller
//! 2. The `FIREWORKS_API_KEY` environment variable
//!
//! The settings file only feeds the CLI, which passes its key as an explicit token.

pub mod models;
pub mod settings;

use std::path::PathBuf;

pub use self::{
    models::{Capability, ModelDescriptor},
    settings::Settings,
};
use crate::error::{FireworksError, Result};

/// Environment variable holding the default API key
pub const API_KEY_ENV: &str = "FIREWORKS_API_KEY";

/// Fixed inference endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.fireworks.ai/inference/v1";

/// Path helpers for on-disk configuration
pub struct Config;

impl Config {
    /// Get the configuration directory path
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fireworks-chat")
    }

    /// Get the settings file path
    #[must_use]
    pub fn settings_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }
}

/// Resolve the API key from an explicit token, falling back to `lookup(FIREWORKS_API_KEY)`
///
/// # Errors
///
/// Returns [`FireworksError::MissingApiKey`] if neither source yields a key
pub fn resolve_api_key<F>(explicit: Option<&str>, lookup: F) -> Result<String>
where
    F: FnOnce(&str) -> Option<String>,
{
    // Empty strings count as absent
    if let Some(token) = explicit.filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    lookup(API_KEY_ENV)
        .filter(|key| !key.is_empty())
        .ok_or(FireworksError::MissingApiKey {
            env_var: API_KEY_ENV,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_config_paths() {
        let path = Config::settings_path();
        assert!(path.ends_with("fireworks-chat/config.json"));
    }

    #[test]
    fn test_explicit_token_wins() {
        let key = resolve_api_key(Some("explicit"), |_| Some("from-env".into())).unwrap();
        assert_eq!(key, "explicit");
    }

    #[test]
    fn test_env_fallback() {
        let key = resolve_api_key(None, |name| {
            assert_eq!(name, API_KEY_ENV);
            Some("from-env".into())
        })
        .unwrap();
        assert_eq!(key, "from-env");

        let key = resolve_api_key(Some(""), |_| Some("from-env".into())).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn test_missing_key() {
        let err = resolve_api_key(None, |_| None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = resolve_api_key(None, |_| Some(String::new())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
