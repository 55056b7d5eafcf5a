//! Server-Sent Events (SSE) parser
//!
//! Parses SSE streams following the W3C spec:
//! https://html.spec.whatwg.org/multipage/server-sent-events.html
//!
//! Input is raw bytes straight off the socket. Lines are only decoded once complete, so a
//! multi-byte character split across two reads is reassembled before UTF-8 validation.

use crate::error::{FireworksError, Result};

/// SSE event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type, when the server names one
    pub event_type: Option<String>,

    /// Event data (JSON payload); multiple `data:` lines are joined with `\n`
    pub data: String,
}

impl SseEvent {
    /// An event is only dispatched once it carries data
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.data.is_empty()
    }

    /// Whether the server named this an `error` event
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.event_type.as_deref() == Some("error")
    }

    /// Check if this is the `[DONE]` terminator of an OpenAI-style stream
    #[must_use]
    pub fn is_done_marker(&self) -> bool {
        self.data == "[DONE]"
    }
}

/// Incremental SSE parser
#[derive(Debug, Default)]
pub struct SseParser {
    /// Event being assembled
    current_event: SseEvent,

    /// Bytes after the last newline seen
    buffer: Vec<u8>,
}

impl SseParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every event it completes
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::Stream`] if a complete line is not valid UTF-8
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = std::str::from_utf8(&raw[..newline])
                .map_err(|e| FireworksError::Stream(format!("invalid UTF-8 in stream: {e}")))?;

            if let Some(event) = self.process_line(line.trim_end_matches('\r')) {
                events.push(event);
            }
        }

        Ok(events)
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        // Blank line dispatches
        if line.is_empty() {
            return self.take_event();
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.current_event.event_type = Some(value.to_string()),
            "data" => {
                if !self.current_event.data.is_empty() {
                    self.current_event.data.push('\n');
                }
                self.current_event.data.push_str(value);
            }
            // id/retry only matter for reconnection, which is never attempted
            _ => {}
        }

        None
    }

    fn take_event(&mut self) -> Option<SseEvent> {
        let event = std::mem::take(&mut self.current_event);
        event.is_complete().then_some(event)
    }

    /// Flush whatever is buffered once the byte stream has ended
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::Stream`] if the trailing bytes are not valid UTF-8
    pub fn finish(&mut self) -> Result<Option<SseEvent>> {
        if !self.buffer.is_empty() {
            let raw = std::mem::take(&mut self.buffer);
            let line = String::from_utf8(raw)
                .map_err(|e| FireworksError::Stream(format!("invalid UTF-8 in stream: {e}")))?;
            self.process_line(line.trim_end_matches('\r'));
        }

        Ok(self.take_event())
    }
}
