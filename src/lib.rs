//! fireworks-chat: chat and transcription front-end for the Fireworks inference API
//!
//! A model name goes in through [`interface::load`]; out comes a [`interface::ChatInterface`]
//! that a [`interface::Host`] can launch. Chat models stream growing snapshots of the reply,
//! whisper models transcribe audio in a single call.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::too_many_lines)]

pub mod adapter;
pub mod cli;
pub mod config;
pub mod error;
pub mod interface;
pub mod messages;
pub mod services;

// Re-exports for convenience
pub use adapter::{ConversationAdapter, ResponseStream};
pub use error::{ErrorKind, FireworksError, Result};
