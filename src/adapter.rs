//! Conversation adapter
//!
//! Binds one model to the inference API. Chat models answer with a lazy stream of growing
//! snapshots; whisper models answer with a single transcribed turn.

use std::{path::Path, pin::Pin, sync::Arc};

use futures::{Stream, StreamExt};
use tracing::{debug, info};

use crate::{
    config::{self, Capability, ModelDescriptor, DEFAULT_BASE_URL},
    error::{FireworksError, Result},
    messages::{AudioInput, Conversation, Turn},
    services::{
        Alignment, AlignmentRequest, CompletionRequest, FireworksClient, InferenceTransport,
        TranscriptionRequest,
    },
};

/// Reply given to a transcription call that carries no audio
pub const NO_AUDIO_MESSAGE: &str =
    "No audio input received. Record or upload an audio clip to transcribe.";

/// Lazy sequence of response snapshots, each the full text so far
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A model bound to the inference API
#[derive(Clone)]
pub struct ConversationAdapter {
    descriptor: ModelDescriptor,
    transport: Arc<dyn InferenceTransport>,
}

impl std::fmt::Debug for ConversationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationAdapter")
            .field("descriptor", &self.descriptor)
            .field("base_url", &self.transport.base_url())
            .finish()
    }
}

impl ConversationAdapter {
    /// Create an adapter against the default inference endpoint
    ///
    /// `token` falls back to `FIREWORKS_API_KEY` when absent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank model name and a configuration error when
    /// no API key can be found
    pub fn new(model: &str, token: Option<&str>) -> Result<Self> {
        Self::with_base_url(model, token, DEFAULT_BASE_URL)
    }

    /// Create an adapter against a custom endpoint
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`]
    pub fn with_base_url(model: &str, token: Option<&str>, base_url: &str) -> Result<Self> {
        Self::build(model, token, base_url, |name| std::env::var(name).ok())
    }

    fn build<F>(model: &str, token: Option<&str>, base_url: &str, env: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let descriptor = ModelDescriptor::resolve(model)?;
        let api_key = config::resolve_api_key(token, env)?;
        let transport = FireworksClient::with_base_url(&api_key, base_url)?;

        info!(
            model = descriptor.identifier(),
            capability = %descriptor.capability(),
            base_url,
            "model loaded"
        );
        Ok(Self::with_transport(descriptor, Arc::new(transport)))
    }

    /// Create an adapter over an arbitrary transport
    #[must_use]
    pub fn with_transport(descriptor: ModelDescriptor, transport: Arc<dyn InferenceTransport>) -> Self {
        Self {
            descriptor,
            transport,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn capability(&self) -> Capability {
        self.descriptor.capability()
    }

    fn require(&self, capability: Capability, operation: &'static str) -> Result<()> {
        if self.descriptor.capability() == capability {
            Ok(())
        } else {
            Err(FireworksError::UnsupportedOperation {
                model: self.descriptor.identifier().to_string(),
                operation,
            })
        }
    }

    /// Stream a reply to `message` given the prior `history`
    ///
    /// Nothing is sent until the stream is first polled. Each item is the full response
    /// accumulated so far. A transport failure is yielded once and ends the stream.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::UnsupportedOperation`] for audio models
    pub fn respond(&self, message: &str, history: &Conversation) -> Result<ResponseStream> {
        self.require(Capability::Chat, "chat completion")?;

        let request = CompletionRequest::streaming(self.descriptor.qualified_path(), history.to_prompt(message));
        debug!(model = %request.model, turns = history.len(), "prepared completion");

        Ok(Box::pin(snapshots(Arc::clone(&self.transport), request)))
    }

    /// Transcribe an audio clip into an assistant turn
    ///
    /// Without audio, returns [`NO_AUDIO_MESSAGE`] and makes no request.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::UnsupportedOperation`] for chat models, or a transport
    /// error from the remote call
    pub async fn transcribe(&self, audio: Option<AudioInput>) -> Result<Turn> {
        self.require(Capability::AudioTranscribe, "transcription")?;

        let Some(audio) = audio else {
            return Ok(Turn::assistant(NO_AUDIO_MESSAGE));
        };

        let response = self
            .transport
            .transcribe(TranscriptionRequest {
                model: self.descriptor.identifier().to_string(),
                audio,
            })
            .await?;

        Ok(Turn::assistant(response.text))
    }

    /// Read `path` (if any) and transcribe it
    ///
    /// # Errors
    ///
    /// Same as [`Self::transcribe`], plus I/O errors reading the file
    pub async fn transcribe_path(&self, path: Option<&Path>) -> Result<Turn> {
        self.require(Capability::AudioTranscribe, "transcription")?;

        let audio = match path {
            Some(path) => Some(AudioInput::from_path(path).await?),
            None => None,
        };
        self.transcribe(audio).await
    }

    /// Align `text` against the words spoken in `audio`
    ///
    /// # Errors
    ///
    /// Returns a validation error for chat models, missing audio or blank text, or a
    /// transport error from the remote call
    pub async fn align(&self, audio: Option<AudioInput>, text: &str) -> Result<Alignment> {
        self.require(Capability::AudioTranscribe, "alignment")?;

        if text.trim().is_empty() {
            return Err(FireworksError::InvalidInput(
                "alignment requires the transcript text".to_string(),
            ));
        }
        let audio = audio.ok_or_else(|| {
            FireworksError::InvalidInput("alignment requires an audio clip".to_string())
        })?;

        self.transport
            .align(AlignmentRequest {
                model: self.descriptor.identifier().to_string(),
                audio,
                text: text.to_string(),
            })
            .await
    }
}

fn snapshots(
    transport: Arc<dyn InferenceTransport>,
    request: CompletionRequest,
) -> impl Stream<Item = Result<String>> + Send {
    async_stream::try_stream! {
        let mut chunks = transport.create_completion(request).await?;
        let mut response_text = String::new();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            response_text.push_str(chunk.delta());
            if let Some(reason) = chunk.finish_reason() {
                debug!(reason, chars = response_text.len(), "completion finished");
            }
            yield response_text.clone();
        }
    }
}
