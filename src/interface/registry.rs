//! Registry entry points: turn a model name into an interface

use tracing::info;

use crate::{
    adapter::ConversationAdapter,
    config::DEFAULT_BASE_URL,
    error::{FireworksError, Result},
};

use super::{ChatInterface, InterfaceOptions};

/// Build an interface for a hosted model
///
/// `token` falls back to `FIREWORKS_API_KEY` when absent.
///
/// # Errors
///
/// Returns a configuration error when no API key is available and a validation error for
/// a blank name or options that do not fit the model
pub fn load(name: &str, token: Option<&str>, options: InterfaceOptions) -> Result<ChatInterface> {
    load_with_base_url(name, token, options, DEFAULT_BASE_URL)
}

/// [`load`] against a custom endpoint
///
/// # Errors
///
/// Same as [`load`]
pub fn load_with_base_url(
    name: &str,
    token: Option<&str>,
    options: InterfaceOptions,
    base_url: &str,
) -> Result<ChatInterface> {
    let adapter = ConversationAdapter::with_base_url(name, token, base_url)?;
    ChatInterface::new(adapter, options)
}

/// Several interfaces shown as named tabs
#[derive(Debug, Clone, Default)]
pub struct Blocks {
    tabs: Vec<ChatInterface>,
}

impl Blocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tab; names must be unique
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidInput`] if a tab with the same name exists
    pub fn tab(mut self, interface: ChatInterface) -> Result<Self> {
        if self.get(interface.name()).is_some() {
            return Err(FireworksError::InvalidInput(format!(
                "duplicate tab {:?}",
                interface.name()
            )));
        }

        info!(tab = interface.name(), "tab added");
        self.tabs.push(interface);
        Ok(self)
    }

    #[must_use]
    pub fn tabs(&self) -> &[ChatInterface] {
        &self.tabs
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ChatInterface> {
        self.tabs.iter().find(|tab| tab.name() == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

impl From<ChatInterface> for Blocks {
    fn from(interface: ChatInterface) -> Self {
        Self {
            tabs: vec![interface],
        }
    }
}
