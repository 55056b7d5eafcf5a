//! Model descriptors and remote path routing

use serde::{Deserialize, Serialize};

use crate::error::{FireworksError, Result};

/// Prefix for ordinary hosted models
pub const MODEL_PATH_PREFIX: &str = "accounts/fireworks/models/";

/// Identifiers served from the agents namespace instead of the models one
const AGENT_ROUTES: &[(&str, &str)] = &[
    ("f1-preview", "accounts/fireworks/agents/f1-preview"),
    ("f1-mini", "accounts/fireworks/agents/f1-mini"),
];

/// Marker substring for speech-to-text models
const AUDIO_MARKER: &str = "whisper";

/// Invocation mode selected for a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Streaming text completion
    Chat,
    /// One-shot speech transcription
    AudioTranscribe,
}

impl Capability {
    /// Derive the capability from a model identifier
    #[must_use]
    pub fn for_identifier(identifier: &str) -> Self {
        if identifier.contains(AUDIO_MARKER) {
            Self::AudioTranscribe
        } else {
            Self::Chat
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::AudioTranscribe => write!(f, "audio-transcribe"),
        }
    }
}

/// A resolved model: identifier plus capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    identifier: String,
    capability: Capability,
}

impl ModelDescriptor {
    /// Resolve a model identifier
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidInput`] if the identifier is blank
    pub fn resolve(identifier: impl Into<String>) -> Result<Self> {
        let identifier = identifier.into();
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err(FireworksError::InvalidInput(
                "model name must be a non-empty string".to_string(),
            ));
        }
        if trimmed.len() != identifier.len() {
            return Err(FireworksError::InvalidInput(format!(
                "model name {identifier:?} has surrounding whitespace"
            )));
        }

        let capability = Capability::for_identifier(&identifier);
        Ok(Self {
            identifier,
            capability,
        })
    }

    /// The short identifier, as supplied by the caller
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub const fn capability(&self) -> Capability {
        self.capability
    }

    /// Fully-prefixed path submitted to the inference service
    #[must_use]
    pub fn qualified_path(&self) -> String {
        AGENT_ROUTES
            .iter()
            .find(|(name, _)| *name == self.identifier)
            .map_or_else(
                || format!("{MODEL_PATH_PREFIX}{}", self.identifier),
                |(_, path)| (*path).to_string(),
            )
    }
}
