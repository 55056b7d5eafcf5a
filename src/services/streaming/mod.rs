//! Streaming support for completion responses
//!
//! Turns the Server-Sent Events body of a streaming `/completions` call into typed
//! [`CompletionChunk`]s.

pub mod completion_stream;
pub mod sse_parser;

pub use completion_stream::{chunk_stream, CompletionStreamHandler};
pub use sse_parser::{SseEvent, SseParser};

use serde::{Deserialize, Serialize};

/// One `data:` payload of a streaming completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    /// In-band error reported after the stream has started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StreamErrorBody>,
}

impl CompletionChunk {
    /// Chunk carrying a single text delta
    #[must_use]
    pub fn text(delta: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice {
                index: 0,
                text: Some(delta.into()),
                finish_reason: None,
            }],
            ..Self::default()
        }
    }

    /// Text delta of the first choice
    ///
    /// A chunk with no choices, or a null `text`, contributes nothing.
    #[must_use]
    pub fn delta(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.text.as_deref())
            .unwrap_or("")
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.finish_reason.as_deref())
    }
}

/// A choice inside a completion chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Error object sent inside the stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}
