//! Service layer for the remote inference API
//!
//! [`InferenceTransport`] is the only way the adapter reaches the network. The production
//! implementation is [`fireworks::FireworksClient`]; tests swap in recording stubs.

pub mod fireworks;
pub mod streaming;
#[cfg(test)]
pub(crate) mod stub;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

pub use self::{
    fireworks::FireworksClient,
    streaming::{CompletionChoice, CompletionChunk},
};
use crate::{error::Result, messages::AudioInput};

/// Decoding parameters sent with every completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl DecodingParams {
    /// The fixed parameters used for chat
    pub const FIXED: Self = Self {
        temperature: 0.6,
        top_p: 1.0,
        max_tokens: 4096,
    };
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self::FIXED
    }
}

/// Body of a `/completions` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Qualified model path
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(flatten)]
    pub params: DecodingParams,
}

impl CompletionRequest {
    /// Streaming request with the fixed decoding parameters
    #[must_use]
    pub fn streaming(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
            params: DecodingParams::FIXED,
        }
    }
}

/// A speech-to-text request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionRequest {
    pub model: String,
    pub audio: AudioInput,
}

/// Response of `/audio/transcriptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

/// A forced-alignment request: audio plus the text spoken in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRequest {
    pub model: String,
    pub audio: AudioInput,
    pub text: String,
}

/// Response of `/audio/alignments`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub words: Vec<AlignedWord>,
}

/// A word with its start and end time in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Stream of decoded completion chunks
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<CompletionChunk>> + Send>>;

/// Outbound calls against the inference API
#[async_trait]
pub trait InferenceTransport: Send + Sync {
    /// Base URL requests are sent to
    fn base_url(&self) -> &str;

    /// Open a streaming completion
    ///
    /// Resolves once response headers arrive; the body is read as the stream is polled.
    async fn create_completion(&self, request: CompletionRequest) -> Result<ChunkStream>;

    /// One-shot transcription
    async fn transcribe(&self, request: TranscriptionRequest) -> Result<TranscriptionResponse>;

    /// One-shot forced alignment
    async fn align(&self, request: AlignmentRequest) -> Result<Alignment>;
}
