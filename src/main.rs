//! fireworks-chat binary entry point

use color_eyre::{eyre::eyre, Result};
use fireworks_chat::{
    cli::{Cli, Commands, DEFAULT_MODEL},
    config::{Config, ModelDescriptor, Settings, DEFAULT_BASE_URL},
    interface::{self, Blocks, Host, InterfaceOptions, TerminalHost},
    ConversationAdapter,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Install error handler
    color_eyre::install()?;

    // Pick up FIREWORKS_API_KEY from a local .env
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("fireworks_chat=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load()?;
    let token = cli.token.as_deref().or(settings.api_key.as_deref());
    let base_url = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

    match cli.command {
        None => {
            chat(Vec::new(), InterfaceOptions::default(), token, base_url, &settings).await?;
        }
        Some(Commands::Chat {
            models,
            title,
            description,
            examples,
        }) => {
            let options = InterfaceOptions {
                title,
                description,
                examples,
                additional_inputs: Vec::new(),
            };
            chat(models, options, token, base_url, &settings).await?;
        }
        Some(Commands::Transcribe { path, model }) => {
            let adapter = ConversationAdapter::with_base_url(&model, token, base_url)?;
            let turn = adapter.transcribe_path(Some(&path)).await?;
            println!("{}", turn.prompt_text());
        }
        Some(Commands::Align { path, text, model }) => {
            let adapter = ConversationAdapter::with_base_url(&model, token, base_url)?;
            let audio = fireworks_chat::messages::AudioInput::from_path(&path).await?;
            let alignment = adapter.align(Some(audio), &text).await?;
            println!("{}", interface::render_alignment(&alignment));
        }
        Some(Commands::Config {
            get,
            set,
            value,
            list,
        }) => {
            if let Some(key) = get {
                println!("{}", settings.get(&key)?.unwrap_or_default());
            } else if let Some(key) = set {
                let mut updated = settings.clone();
                updated.set(&key, value.as_deref().unwrap_or_default())?;
                updated.save()?;
            } else if list {
                for (key, value) in settings.entries() {
                    println!("{key} = {value}");
                }
            } else {
                println!("{}", Config::settings_path().display());
            }
        }
        Some(Commands::Route { model }) => {
            let descriptor = ModelDescriptor::resolve(model)?;
            println!("{}\t{}", descriptor.qualified_path(), descriptor.capability());
        }
        Some(Commands::Version) => {
            println!("fireworks-chat version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Load each model as a tab and run the terminal host
async fn chat(
    mut models: Vec<String>,
    options: InterfaceOptions,
    token: Option<&str>,
    base_url: &str,
    settings: &Settings,
) -> Result<()> {
    if models.is_empty() {
        models.push(
            settings
                .default_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        );
    }

    let mut blocks = Blocks::new();
    for (i, model) in models.iter().enumerate() {
        // Display options describe the first tab only
        let tab_options = if i == 0 {
            options.clone()
        } else {
            InterfaceOptions::default()
        };
        blocks = blocks.tab(interface::load_with_base_url(model, token, tab_options, base_url)?)?;
    }

    if blocks.is_empty() {
        return Err(eyre!("no models to load"));
    }

    TerminalHost::stdio().launch(blocks).await?;
    Ok(())
}
