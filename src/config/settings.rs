//! User settings file (`<config_dir>/fireworks-chat/config.json`)

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{FireworksError, Result};

/// Persisted user settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// API key used when `--token` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override for the inference base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model loaded when none is named on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl Settings {
    /// Load settings from the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load() -> Result<Self> {
        let path = super::Config::settings_path();
        Self::load_from_path(&path)
    }

    /// Load settings from a specific path; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| FireworksError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&contents).map_err(|e| FireworksError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if let Some(base_url) = &settings.base_url {
            check_base_url(base_url).map_err(|message| FireworksError::ConfigParse {
                path: path.to_path_buf(),
                message,
            })?;
        }

        Ok(settings)
    }

    /// Save settings to the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&super::Config::settings_path())
    }

    /// Save settings to a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Read one setting by key
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidInput`] for an unknown key
    pub fn get(&self, key: &str) -> Result<Option<&str>> {
        let value = match key {
            "api_key" => &self.api_key,
            "base_url" => &self.base_url,
            "default_model" => &self.default_model,
            _ => return Err(unknown_key(key)),
        };
        Ok(value.as_deref())
    }

    /// Set one setting by key; an empty value clears it
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidInput`] for an unknown key or a value the key
    /// does not accept
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = Some(value.trim()).filter(|v| !v.is_empty()).map(str::to_string);
        match key {
            "api_key" => self.api_key = value,
            "base_url" => {
                if let Some(base_url) = &value {
                    check_base_url(base_url).map_err(FireworksError::InvalidInput)?;
                }
                self.base_url = value;
            }
            "default_model" => {
                if let Some(model) = &value {
                    super::ModelDescriptor::resolve(model.as_str())?;
                }
                self.default_model = value;
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Stored settings as `(key, value)` pairs, with the API key masked
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        if self.api_key.is_some() {
            entries.push(("api_key", "********".to_string()));
        }
        if let Some(base_url) = &self.base_url {
            entries.push(("base_url", base_url.clone()));
        }
        if let Some(model) = &self.default_model {
            entries.push(("default_model", model.clone()));
        }
        entries
    }
}

fn check_base_url(base_url: &str) -> std::result::Result<(), String> {
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        Ok(())
    } else {
        Err(format!("base_url must be an http(s) URL, got {base_url:?}"))
    }
}

fn unknown_key(key: &str) -> FireworksError {
    FireworksError::InvalidInput(format!(
        "unknown setting {key:?} (expected api_key, base_url or default_model)"
    ))
}
