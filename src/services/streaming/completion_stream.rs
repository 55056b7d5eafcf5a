//! Completion streaming handler
//!
//! Processes Server-Sent Events from the `/completions` endpoint and decodes each event
//! into a [`CompletionChunk`].

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};

use crate::error::{FireworksError, Result};

use super::{CompletionChunk, SseEvent, SseParser};

/// Handler for a streaming completion body
#[derive(Debug, Default)]
pub struct CompletionStreamHandler {
    parser: SseParser,

    /// Set once the `[DONE]` marker has been seen
    done: bool,
}

impl CompletionStreamHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a chunk of body bytes
    ///
    /// Returns the completion chunks it contains, in order. Anything after `[DONE]` is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if an event is not valid JSON or carries an in-band error
    pub fn process_bytes(&mut self, bytes: &[u8]) -> Result<Vec<CompletionChunk>> {
        if self.done {
            return Ok(Vec::new());
        }

        let events = self.parser.feed(bytes)?;
        self.decode_events(events)
    }

    /// Flush the parser once the body has ended
    ///
    /// # Errors
    ///
    /// Returns an error if the trailing event cannot be decoded
    pub fn finish(&mut self) -> Result<Vec<CompletionChunk>> {
        if self.done {
            return Ok(Vec::new());
        }

        let trailing = self.parser.finish()?;
        self.decode_events(trailing.into_iter().collect())
    }

    /// Whether the `[DONE]` marker has been received
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    fn decode_events(&mut self, events: Vec<SseEvent>) -> Result<Vec<CompletionChunk>> {
        let mut chunks = Vec::with_capacity(events.len());
        for event in events {
            if event.is_done_marker() {
                self.done = true;
                break;
            }
            chunks.push(Self::decode_event(&event)?);
        }
        Ok(chunks)
    }

    fn decode_event(event: &SseEvent) -> Result<CompletionChunk> {
        // A named error event may carry a bare message instead of a JSON error object
        if event.is_error() {
            let message = serde_json::from_str::<CompletionChunk>(&event.data)
                .ok()
                .and_then(|chunk| chunk.error)
                .map_or_else(|| event.data.clone(), |error| error.message);
            return Err(FireworksError::Stream(message));
        }

        let chunk: CompletionChunk = serde_json::from_str(&event.data)
            .map_err(|e| FireworksError::Stream(format!("failed to parse SSE event: {e}")))?;

        if let Some(error) = &chunk.error {
            return Err(FireworksError::Stream(error.message.clone()));
        }

        Ok(chunk)
    }
}

/// Convert a response body into a stream of completion chunks
///
/// The body is only read as the returned stream is polled. Errors end the stream.
pub fn chunk_stream<S, E>(byte_stream: S) -> impl Stream<Item = Result<CompletionChunk>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<FireworksError> + Send + 'static,
{
    async_stream::stream! {
        let mut handler = CompletionStreamHandler::new();
        let mut byte_stream = Box::pin(byte_stream);

        while let Some(next) = byte_stream.next().await {
            let bytes = match next {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };

            match handler.process_bytes(&bytes) {
                Ok(chunks) => {
                    for chunk in chunks {
                        yield Ok(chunk);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }

            if handler.is_done() {
                return;
            }
        }

        match handler.finish() {
            Ok(chunks) => {
                for chunk in chunks {
                    yield Ok(chunk);
                }
            }
            Err(e) => {
                yield Err(e);
            }
        }
    }
}
