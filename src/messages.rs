//! Conversation types
//!
//! A [`Conversation`] is the history the host hands back on every turn. Nothing in this
//! crate stores it between calls or mutates it.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Message role in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Reference to an audio file held by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRef {
    pub path: PathBuf,
}

/// Turn payload: plain text or an audio reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Audio(AudioRef),
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    /// Create a new user turn
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    /// Create a new assistant turn
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Text(text.into()),
        }
    }

    /// Create a user turn pointing at an audio file
    #[must_use]
    pub fn user_audio(path: impl Into<PathBuf>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Audio(AudioRef { path: path.into() }),
        }
    }

    /// Text as it appears in a prompt; audio turns render as their file name
    #[must_use]
    pub fn prompt_text(&self) -> String {
        match &self.content {
            TurnContent::Text(text) => text.clone(),
            TurnContent::Audio(audio) => format!("[audio: {}]", audio.path.display()),
        }
    }

    /// Text content, if this is a text turn
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            TurnContent::Text(text) => Some(text),
            TurnContent::Audio(_) => None,
        }
    }
}

/// Ordered conversation history, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a conversation from `(user, assistant)` exchanges
    #[must_use]
    pub fn from_exchanges<U, A>(exchanges: impl IntoIterator<Item = (U, A)>) -> Self
    where
        U: Into<String>,
        A: Into<String>,
    {
        let turns = exchanges
            .into_iter()
            .flat_map(|(user, assistant)| [Turn::user(user), Turn::assistant(assistant)])
            .collect();
        Self { turns }
    }

    /// Returns a new conversation with `turn` appended
    #[must_use]
    pub fn with_turn(&self, turn: Turn) -> Self {
        let mut turns = self.turns.clone();
        turns.push(turn);
        Self { turns }
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render the history plus a new user message as a completion prompt
    ///
    /// Each prior exchange becomes `User: {u}\nAssistant: {a}\n`; the new message is
    /// appended as `User: {message}\nAssistant: ` so the model continues from there.
    #[must_use]
    pub fn to_prompt(&self, message: &str) -> String {
        let mut prompt = String::new();
        for turn in &self.turns {
            let label = match turn.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            prompt.push_str(label);
            prompt.push_str(": ");
            prompt.push_str(&turn.prompt_text());
            prompt.push('\n');
        }
        prompt.push_str("User: ");
        prompt.push_str(message);
        prompt.push_str("\nAssistant: ");
        prompt
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

/// Encodings the transcription endpoint accepts without re-declaration
const SUPPORTED_AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "m4a", "ogg", "webm"];

/// Extension declared for audio in any other container
const FALLBACK_AUDIO_EXTENSION: &str = "wav";

/// Audio payload ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInput {
    bytes: Bytes,
    file_name: String,
}

impl AudioInput {
    /// Wrap in-memory audio with the name it should be uploaded under
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
        }
    }

    /// Read an audio file; the file itself is never renamed or rewritten
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "audio".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(bytes, file_name))
    }

    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name declared in the upload
    ///
    /// Names with a supported extension are kept. Anything else is declared as
    /// `<stem>.wav`.
    #[must_use]
    pub fn normalized_file_name(&self) -> String {
        let path = Path::new(&self.file_name);
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        match extension {
            Some(ext) if SUPPORTED_AUDIO_EXTENSIONS.contains(&ext.as_str()) => {
                self.file_name.clone()
            }
            _ => {
                let stem = path
                    .file_stem()
                    .map_or_else(|| "audio".to_string(), |s| s.to_string_lossy().into_owned());
                format!("{stem}.{FALLBACK_AUDIO_EXTENSION}")
            }
        }
    }

    /// MIME type matching [`Self::normalized_file_name`]
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        let name = self.normalized_file_name();
        let extension = Path::new(&name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "mp3" => "audio/mpeg",
            "flac" => "audio/flac",
            "m4a" => "audio/mp4",
            "ogg" => "audio/ogg",
            "webm" => "audio/webm",
            _ => "audio/wav",
        }
    }
}
