//! CLI argument parsing and command routing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Model used when neither `--model` nor the settings file names one
pub const DEFAULT_MODEL: &str = "llama-v3p1-405b-instruct";

/// fireworks-chat: talk to models hosted on Fireworks
#[derive(Debug, Parser)]
#[command(name = "fireworks-chat")]
#[command(about = "Chat with and transcribe audio through models hosted on Fireworks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API key (defaults to the settings file, then FIREWORKS_API_KEY)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an interactive session (default)
    Chat {
        /// Model to load; repeat to open several tabs
        #[arg(short, long = "model")]
        models: Vec<String>,

        /// Title shown above the first tab
        #[arg(long)]
        title: Option<String>,

        /// Description shown above the first tab
        #[arg(long)]
        description: Option<String>,

        /// Example prompt; repeatable
        #[arg(long = "example")]
        examples: Vec<String>,
    },

    /// Transcribe an audio file
    Transcribe {
        /// Audio file to transcribe
        path: PathBuf,

        /// Speech-to-text model
        #[arg(short, long, default_value = "whisper-v3")]
        model: String,
    },

    /// Align a transcript against an audio file
    Align {
        /// Audio file
        path: PathBuf,

        /// Text spoken in the audio
        text: String,

        /// Speech-to-text model
        #[arg(short, long, default_value = "whisper-v3")]
        model: String,
    },

    /// Manage the settings file
    Config {
        /// Get a setting
        #[arg(long, conflicts_with_all = ["set", "list"])]
        get: Option<String>,

        /// Set a setting (an empty value clears it)
        #[arg(long, requires = "value")]
        set: Option<String>,

        /// Value to set (used with --set)
        #[arg(long)]
        value: Option<String>,

        /// List all stored settings
        #[arg(long)]
        list: bool,
    },

    /// Show how a model name is routed
    Route {
        /// Model identifier
        model: String,
    },

    /// Show version information
    Version,
}

impl Cli {
    /// Parse CLI arguments from environment
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
