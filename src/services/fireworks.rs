//! Fireworks inference API client
//!
//! Supports:
//! - Streaming text completions (`/completions`)
//! - Audio transcription (`/audio/transcriptions`)
//! - Audio/text forced alignment (`/audio/alignments`)

use async_trait::async_trait;
use reqwest::{
    header,
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    error::{FireworksError, Result},
    messages::AudioInput,
};

use super::{
    streaming::chunk_stream, Alignment, AlignmentRequest, ChunkStream, CompletionRequest,
    InferenceTransport, TranscriptionRequest, TranscriptionResponse,
};

/// HTTP transport for the Fireworks inference API
#[derive(Debug, Clone)]
pub struct FireworksClient {
    client: Client,
    base_url: String,
}

impl FireworksClient {
    /// Create a client against a custom endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the API key cannot be sent as a header or the client fails to build
    pub fn with_base_url(api_key: &str, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = header::HeaderMap::new();
                let mut auth = header::HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|_| FireworksError::InvalidConfig("Invalid API key format".to_string()))?;
                auth.set_sensitive(true);
                headers.insert(header::AUTHORIZATION, auth);
                headers
            })
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn audio_part(audio: &AudioInput) -> Result<Part> {
        let part = Part::bytes(audio.bytes().to_vec())
            .file_name(audio.normalized_file_name())
            .mime_str(audio.mime_type())?;
        Ok(part)
    }

    /// Turn a non-2xx response into [`FireworksError::Api`]
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await?;
        warn!(status = status.as_u16(), %message, "inference request failed");
        Err(FireworksError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let response = self
            .client
            .post(self.endpoint(path))
            .multipart(form)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl InferenceTransport for FireworksClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn create_completion(&self, request: CompletionRequest) -> Result<ChunkStream> {
        debug!(model = %request.model, prompt_len = request.prompt.len(), "opening completion stream");

        let response = self
            .client
            .post(self.endpoint("completions"))
            .header(header::ACCEPT, "text/event-stream")
            .json(&request)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(Box::pin(chunk_stream(response.bytes_stream())))
    }

    async fn transcribe(&self, request: TranscriptionRequest) -> Result<TranscriptionResponse> {
        debug!(
            model = %request.model,
            file = %request.audio.normalized_file_name(),
            bytes = request.audio.bytes().len(),
            "submitting transcription"
        );

        let form = Form::new()
            .text("model", request.model)
            .text("response_format", "json")
            .part("file", Self::audio_part(&request.audio)?);

        self.post_form("audio/transcriptions", form).await
    }

    async fn align(&self, request: AlignmentRequest) -> Result<Alignment> {
        debug!(model = %request.model, text_len = request.text.len(), "submitting alignment");

        let form = Form::new()
            .text("model", request.model)
            .text("text", request.text)
            .part("file", Self::audio_part(&request.audio)?);

        self.post_form("audio/alignments", form).await
    }
}
