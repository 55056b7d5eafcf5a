//! In-memory transport for unit tests

use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;

use crate::error::{FireworksError, Result};

use super::{
    Alignment, AlignmentRequest, ChunkStream, CompletionChunk, CompletionRequest,
    InferenceTransport, TranscriptionRequest, TranscriptionResponse,
};

/// A call seen by [`StubTransport`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Completion(CompletionRequest),
    Transcription(TranscriptionRequest),
    Alignment(AlignmentRequest),
}

/// Scripted transport that records every request
#[derive(Debug, Default)]
pub struct StubTransport {
    calls: Mutex<Vec<RecordedCall>>,
    deltas: Vec<String>,
    fail_after: Option<usize>,
    transcript: String,
}

impl StubTransport {
    #[must_use]
    pub fn with_deltas(deltas: &[&str]) -> Self {
        Self {
            deltas: deltas.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// Emit a transport error after `n` chunks
    #[must_use]
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    #[must_use]
    pub fn with_transcript(text: &str) -> Self {
        Self {
            transcript: text.to_string(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl InferenceTransport for StubTransport {
    fn base_url(&self) -> &str {
        "http://stub.invalid/v1"
    }

    async fn create_completion(&self, request: CompletionRequest) -> Result<ChunkStream> {
        self.record(RecordedCall::Completion(request));

        let mut items: Vec<Result<CompletionChunk>> = self
            .deltas
            .iter()
            .map(|d| Ok(CompletionChunk::text(d.clone())))
            .collect();
        if let Some(n) = self.fail_after {
            items.truncate(n);
            items.push(Err(FireworksError::Stream("connection reset".into())));
        }

        Ok(Box::pin(stream::iter(items)))
    }

    async fn transcribe(&self, request: TranscriptionRequest) -> Result<TranscriptionResponse> {
        self.record(RecordedCall::Transcription(request));
        Ok(TranscriptionResponse {
            text: self.transcript.clone(),
        })
    }

    async fn align(&self, request: AlignmentRequest) -> Result<Alignment> {
        let text = request.text.clone();
        self.record(RecordedCall::Alignment(request));
        Ok(Alignment {
            text,
            words: Vec::new(),
        })
    }
}
