//! Host-facing interface layer
//!
//! A [`ChatInterface`] is what `registry::load` hands to a [`Host`]: an adapter plus the
//! display options and input widgets the host should render. The host calls
//! [`ChatInterface::submit`] once per user turn and renders whatever comes back.

pub mod registry;
pub mod terminal;

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use self::{
    registry::{load, load_with_base_url, Blocks},
    terminal::TerminalHost,
};
use crate::{
    adapter::{ConversationAdapter, ResponseStream},
    config::Capability,
    error::{FireworksError, Result},
    messages::{AudioInput, Conversation, Turn},
    services::Alignment,
};

/// Kind of an additional input widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Free text; on audio interfaces it carries the transcript to align against
    Textbox,
    /// Recorded or uploaded audio clip
    Audio,
}

/// An input rendered next to the message box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalInput {
    pub label: String,
    pub kind: InputKind,
}

impl AdditionalInput {
    #[must_use]
    pub fn textbox(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: InputKind::Textbox,
        }
    }

    #[must_use]
    pub fn audio(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: InputKind::Audio,
        }
    }
}

/// Display options for an interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Canned prompts the host offers to the user
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub additional_inputs: Vec<AdditionalInput>,
}

impl InterfaceOptions {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    #[must_use]
    pub fn input(mut self, input: AdditionalInput) -> Self {
        self.additional_inputs.push(input);
        self
    }

    /// Check the options against the capability they will be used with
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidInput`] describing the first problem found
    pub fn validate(&self, capability: Capability) -> Result<()> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(invalid("title must not be blank"));
        }
        if self.examples.iter().any(|e| e.trim().is_empty()) {
            return Err(invalid("examples must not be blank"));
        }

        let mut labels = HashSet::new();
        for input in &self.additional_inputs {
            if input.label.trim().is_empty() {
                return Err(invalid("input labels must not be blank"));
            }
            if !labels.insert(input.label.as_str()) {
                return Err(invalid(&format!("duplicate input label {:?}", input.label)));
            }
        }

        let count = |kind| {
            self.additional_inputs
                .iter()
                .filter(|input| input.kind == kind)
                .count()
        };
        match capability {
            Capability::Chat if !self.additional_inputs.is_empty() => {
                Err(invalid("chat interfaces take no additional inputs"))
            }
            Capability::AudioTranscribe if count(InputKind::Audio) > 1 => {
                Err(invalid("audio interfaces take a single audio input"))
            }
            Capability::AudioTranscribe if count(InputKind::Textbox) > 1 => {
                Err(invalid("audio interfaces take at most one transcript textbox"))
            }
            _ => Ok(()),
        }
    }
}

fn invalid(message: &str) -> FireworksError {
    FireworksError::InvalidInput(message.to_string())
}

/// Value supplied for an additional input on one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    Text(String),
    Audio(Option<AudioInput>),
}

impl InputValue {
    const fn kind(&self) -> InputKind {
        match self {
            Self::Text(_) => InputKind::Textbox,
            Self::Audio(_) => InputKind::Audio,
        }
    }
}

/// What a submission produces for the host to render
pub enum InterfaceOutput {
    /// Final text, rendered once
    Text(String),
    /// Growing snapshots, each replacing the last
    Stream(ResponseStream),
    /// A complete assistant turn
    Turn(Turn),
}

impl std::fmt::Debug for InterfaceOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Turn(turn) => f.debug_tuple("Turn").field(turn).finish(),
        }
    }
}

/// A model wired up for a host
#[derive(Debug, Clone)]
pub struct ChatInterface {
    name: String,
    adapter: ConversationAdapter,
    options: InterfaceOptions,
}

impl ChatInterface {
    /// Wrap an adapter; audio interfaces get an `Audio` input if none was declared
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidInput`] if the options do not fit the model
    pub fn new(adapter: ConversationAdapter, mut options: InterfaceOptions) -> Result<Self> {
        let capability = adapter.capability();
        options.validate(capability)?;

        if capability == Capability::AudioTranscribe
            && !options
                .additional_inputs
                .iter()
                .any(|input| input.kind == InputKind::Audio)
        {
            options.additional_inputs.insert(0, AdditionalInput::audio("Audio"));
        }

        Ok(Self {
            name: adapter.descriptor().identifier().to_string(),
            adapter,
            options,
        })
    }

    /// Model identifier, also used as the tab name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.options.title.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn options(&self) -> &InterfaceOptions {
        &self.options
    }

    #[must_use]
    pub fn adapter(&self) -> &ConversationAdapter {
        &self.adapter
    }

    /// Handle one user turn
    ///
    /// `inputs` are matched positionally against the declared additional inputs. Chat
    /// models stream; audio models transcribe the audio input, or align it against the
    /// transcript textbox when one is filled in.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `inputs` do not match the declared widgets, and
    /// whatever the adapter returns otherwise
    pub async fn submit(
        &self,
        message: &str,
        history: &Conversation,
        inputs: &[InputValue],
    ) -> Result<InterfaceOutput> {
        if inputs.len() > self.options.additional_inputs.len() {
            return Err(invalid(&format!(
                "{} inputs supplied but only {} declared",
                inputs.len(),
                self.options.additional_inputs.len()
            )));
        }
        for (value, declared) in inputs.iter().zip(&self.options.additional_inputs) {
            if value.kind() != declared.kind {
                return Err(invalid(&format!("input {:?} has the wrong kind", declared.label)));
            }
        }

        match self.adapter.capability() {
            Capability::Chat => Ok(InterfaceOutput::Stream(self.adapter.respond(message, history)?)),
            Capability::AudioTranscribe => self.submit_audio(inputs).await,
        }
    }

    async fn submit_audio(&self, inputs: &[InputValue]) -> Result<InterfaceOutput> {
        let mut audio = None;
        let mut transcript = None;
        for value in inputs {
            match value {
                InputValue::Audio(clip) => audio = clip.clone(),
                InputValue::Text(text) if !text.trim().is_empty() => transcript = Some(text.as_str()),
                InputValue::Text(_) => {}
            }
        }

        match transcript {
            Some(text) if audio.is_some() => {
                let alignment = self.adapter.align(audio, text).await?;
                Ok(InterfaceOutput::Text(render_alignment(&alignment)))
            }
            _ => Ok(InterfaceOutput::Turn(self.adapter.transcribe(audio).await?)),
        }
    }
}

/// One `start-end word` line per aligned word
#[must_use]
pub fn render_alignment(alignment: &Alignment) -> String {
    if alignment.words.is_empty() {
        return alignment.text.clone();
    }

    alignment
        .words
        .iter()
        .map(|w| format!("{:>7.2}-{:<7.2} {}", w.start, w.end, w.word))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Something that can present interfaces to a user
#[async_trait]
pub trait Host {
    /// Run until the user leaves
    async fn launch(&mut self, app: Blocks) -> Result<()>;
}
