//! Line-oriented terminal host
//!
//! Streams chat replies in place and keeps one conversation per tab. Audio tabs take a
//! file path per line, optionally followed by ` | transcript` to request an alignment.

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tracing::debug;

use crate::{
    config::Capability,
    error::{FireworksError, Result},
    messages::{AudioInput, Conversation, Turn},
};

use super::{Blocks, ChatInterface, Host, InputKind, InputValue, InterfaceOutput};

const HELP: &str = "\
Commands:
  /tabs          list loaded models
  /tab <name>    switch to another model
  /example <n>   send example n
  /clear         forget this tab's conversation
  /quit          leave
";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Help,
    Tabs,
    Tab(&'a str),
    Example(usize),
    Clear,
    Unknown(&'a str),
    Message(&'a str),
}

impl<'a> Command<'a> {
    /// Only known command words are commands; any other `/...` line (such as an absolute
    /// audio path) is passed through as a message
    fn parse(line: &'a str) -> Self {
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Message(line);
        };

        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, arg)| (name, arg.trim()));
        match name {
            "quit" | "exit" => Self::Quit,
            "help" => Self::Help,
            "tabs" => Self::Tabs,
            "tab" if !arg.is_empty() => Self::Tab(arg),
            "clear" => Self::Clear,
            "example" => arg
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .map_or(Self::Unknown(line), Self::Example),
            "tab" => Self::Unknown(line),
            _ => Self::Message(line),
        }
    }
}

/// Terminal host over any async reader/writer pair
pub struct TerminalHost<R, W> {
    reader: R,
    writer: W,
}

impl TerminalHost<BufReader<Stdin>, Stdout> {
    /// Host bound to the process's stdin and stdout
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> TerminalHost<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Give back the writer, e.g. to inspect captured output
    pub fn into_writer(self) -> W {
        self.writer
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn banner(&mut self, tab: &ChatInterface) -> Result<()> {
        let mut banner = format!("== {} ({}) ==\n", tab.title(), tab.adapter().capability());
        if let Some(description) = &tab.options().description {
            banner.push_str(description);
            banner.push('\n');
        }
        for (i, example) in tab.options().examples.iter().enumerate() {
            banner.push_str(&format!("  [{}] {example}\n", i + 1));
        }
        if tab.adapter().capability() == Capability::AudioTranscribe {
            banner.push_str("Enter a path to an audio file.\n");
        }
        self.write(&banner).await
    }

    /// Submit one line to `tab`, render the reply and return the turns to record
    async fn exchange(
        &mut self,
        tab: &ChatInterface,
        history: &Conversation,
        line: &str,
    ) -> Result<Option<(Turn, Turn)>> {
        let (message, inputs, user_turn) = match Self::prepare(tab, line).await {
            Ok(prepared) => prepared,
            Err(e) => {
                self.write(&format!("[error] {e}\n")).await?;
                return Ok(None);
            }
        };

        let output = match tab.submit(&message, history, &inputs).await {
            Ok(output) => output,
            Err(e) => {
                self.write(&format!("[error] {e}\n")).await?;
                return Ok(None);
            }
        };

        let reply = match output {
            InterfaceOutput::Text(text) => {
                self.write(&format!("{text}\n")).await?;
                Turn::assistant(text)
            }
            InterfaceOutput::Turn(turn) => {
                self.write(&format!("{}\n", turn.prompt_text())).await?;
                turn
            }
            InterfaceOutput::Stream(mut stream) => {
                let mut printed = String::new();
                while let Some(snapshot) = stream.next().await {
                    match snapshot {
                        Ok(snapshot) => {
                            self.write(&snapshot[printed.len()..]).await?;
                            printed = snapshot;
                        }
                        Err(e) => {
                            self.write(&format!("\n[error] {e}\n")).await?;
                            return Ok(None);
                        }
                    }
                }
                self.write("\n").await?;
                Turn::assistant(printed)
            }
        };

        Ok(Some((user_turn, reply)))
    }

    /// Map a raw line onto the message and input values the tab expects
    async fn prepare(tab: &ChatInterface, line: &str) -> Result<(String, Vec<InputValue>, Turn)> {
        if tab.adapter().capability() == Capability::Chat {
            return Ok((line.to_string(), Vec::new(), Turn::user(line)));
        }

        let (path, transcript) = line
            .split_once(" | ")
            .map_or((line.trim(), ""), |(path, text)| (path.trim(), text.trim()));
        let audio = if path.is_empty() {
            None
        } else {
            Some(AudioInput::from_path(Path::new(path)).await?)
        };

        let inputs = tab
            .options()
            .additional_inputs
            .iter()
            .map(|input| match input.kind {
                InputKind::Audio => InputValue::Audio(audio.clone()),
                InputKind::Textbox => InputValue::Text(transcript.to_string()),
            })
            .collect();
        let user_turn = if path.is_empty() {
            Turn::user("")
        } else {
            Turn::user_audio(path)
        };

        Ok((String::new(), inputs, user_turn))
    }
}

#[async_trait]
impl<R, W> Host for TerminalHost<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn launch(&mut self, app: Blocks) -> Result<()> {
        let Some(first) = app.tabs().first() else {
            return Err(FireworksError::InvalidInput("no interfaces to launch".to_string()));
        };

        let mut active = first.name().to_string();
        let mut histories: HashMap<String, Conversation> = HashMap::new();
        self.banner(first).await?;

        let mut line = String::new();
        loop {
            self.write("> ").await?;
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                break;
            }
            let input = line.trim_end_matches(['\n', '\r']).to_string();

            let tab = app
                .get(&active)
                .ok_or_else(|| FireworksError::InvalidInput(format!("unknown tab {active:?}")))?;

            let message = match Command::parse(&input) {
                Command::Quit => break,
                Command::Help => {
                    self.write(HELP).await?;
                    continue;
                }
                Command::Tabs => {
                    let listing: String = app
                        .tabs()
                        .iter()
                        .map(|t| {
                            let marker = if t.name() == active { "*" } else { " " };
                            format!("{marker} {} ({})\n", t.name(), t.adapter().capability())
                        })
                        .collect();
                    self.write(&listing).await?;
                    continue;
                }
                Command::Tab(name) => {
                    match app.get(name) {
                        Some(next) => {
                            active = next.name().to_string();
                            self.banner(next).await?;
                        }
                        None => self.write(&format!("[error] no tab named {name:?}\n")).await?,
                    }
                    continue;
                }
                Command::Clear => {
                    histories.remove(&active);
                    continue;
                }
                Command::Example(n) => match tab.options().examples.get(n - 1) {
                    Some(example) => {
                        self.write(&format!("{example}\n")).await?;
                        example.clone()
                    }
                    None => {
                        self.write(&format!("[error] no example {n}\n")).await?;
                        continue;
                    }
                },
                Command::Unknown(cmd) => {
                    self.write(&format!("[error] unknown command {cmd:?}, try /help\n")).await?;
                    continue;
                }
                Command::Message(text) => {
                    if text.trim().is_empty() && tab.adapter().capability() == Capability::Chat {
                        continue;
                    }
                    text.to_string()
                }
            };

            let history = histories.get(&active).cloned().unwrap_or_default();
            if let Some((user, reply)) = self.exchange(tab, &history, &message).await? {
                debug!(tab = %active, turns = history.len() + 2, "turn recorded");
                histories.insert(active.clone(), history.with_turn(user).with_turn(reply));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        adapter::{ConversationAdapter, NO_AUDIO_MESSAGE},
        config::ModelDescriptor,
        interface::InterfaceOptions,
        services::{
            stub::{RecordedCall, StubTransport},
            InferenceTransport,
        },
    };

    fn tab(model: &str, stub: &Arc<StubTransport>, options: InterfaceOptions) -> ChatInterface {
        let transport: Arc<dyn InferenceTransport> = stub.clone();
        let adapter = ConversationAdapter::with_transport(ModelDescriptor::resolve(model).unwrap(), transport);
        ChatInterface::new(adapter, options).unwrap()
    }

    async fn run(app: Blocks, script: &str) -> String {
        let mut host = TerminalHost::new(script.as_bytes(), Vec::new());
        host.launch(app).await.unwrap();
        String::from_utf8(host.into_writer()).unwrap()
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("hello"), Command::Message("hello"));
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/tab f1-mini"), Command::Tab("f1-mini"));
        assert_eq!(Command::parse("/example 2"), Command::Example(2));
        assert_eq!(Command::parse("/example 0"), Command::Unknown("/example 0"));
        assert_eq!(Command::parse("/tab"), Command::Unknown("/tab"));
        assert_eq!(
            Command::parse("/tmp/clips/memo.wav"),
            Command::Message("/tmp/clips/memo.wav")
        );
        assert_eq!(
            Command::parse("/tmp/clips/memo.wav | hello"),
            Command::Message("/tmp/clips/memo.wav | hello")
        );
    }

    #[tokio::test]
    async fn test_help_on_chat_tab() {
        let stub = Arc::new(StubTransport::with_deltas(&["ok"]));
        let app = Blocks::from(tab("llama-v3p1-405b-instruct", &stub, InterfaceOptions::default()));

        let output = run(app, "/help
/tab
/quit
").await;
        assert!(output.contains("/tab <name>    switch to another model"));
        assert!(output.contains("[error] unknown command \"/tab\", try /help"));
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_chat_session_keeps_history() {
        let stub = Arc::new(StubTransport::with_deltas(&["Hello", " world"]));
        let app = Blocks::from(tab("llama-v3p1-405b-instruct", &stub, InterfaceOptions::default()));

        let output = run(app, "hi\nagain\n/quit\n").await;
        assert!(output.contains("Hello world\n"));

        let calls = stub.calls();
        assert_eq!(calls.len(), 2);
        match &calls[1] {
            RecordedCall::Completion(request) => assert_eq!(
                request.prompt,
                "User: hi\nAssistant: Hello world\nUser: again\nAssistant: "
            ),
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_examples_and_clear() {
        let stub = Arc::new(StubTransport::with_deltas(&["ok"]));
        let options = InterfaceOptions::default()
            .description("Chat with f1-preview model.")
            .example("How many R are there in the word Strawberry?");
        let app = Blocks::from(tab("f1-preview", &stub, options));

        let output = run(app, "/example 1\n/clear\n/example 9\nnext\n").await;
        assert!(output.contains("Chat with f1-preview model."));
        assert!(output.contains("[error] no example 9"));

        let calls = stub.calls();
        assert_eq!(calls.len(), 2);
        match &calls[1] {
            RecordedCall::Completion(request) => {
                assert_eq!(request.prompt, "User: next\nAssistant: ");
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tab_switching() {
        let chat = Arc::new(StubTransport::with_deltas(&["ok"]));
        let audio = Arc::new(StubTransport::with_transcript("unused"));
        let app = Blocks::new()
            .tab(tab("llama-v3p1-405b-instruct", &chat, InterfaceOptions::default()))
            .unwrap()
            .tab(tab("whisper-v3", &audio, InterfaceOptions::default()))
            .unwrap();

        let output = run(app, "/tabs\n/tab whisper-v3\n\n/tab nope\n").await;
        assert!(output.contains("* llama-v3p1-405b-instruct (chat)"));
        assert!(output.contains("whisper-v3 (audio-transcribe)"));
        assert!(output.contains(NO_AUDIO_MESSAGE));
        assert!(output.contains("[error] no tab named \"nope\""));
        assert!(chat.calls().is_empty());
        assert!(audio.calls().is_empty());
    }

    #[tokio::test]
    async fn test_audio_tab_transcribes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("memo.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let stub = Arc::new(StubTransport::with_transcript("buy milk"));
        let app = Blocks::from(tab("whisper-v3", &stub, InterfaceOptions::default()));

        // TempDir paths are absolute, so the line starts with '/' on unix
        let output = run(app, &format!("{}\n", path.display())).await;
        assert!(!output.contains("unknown command"));
        assert!(output.contains("buy milk\n"));
        match stub.calls().as_slice() {
            [RecordedCall::Transcription(request)] => assert_eq!(request.audio.file_name(), "memo.wav"),
            other => panic!("unexpected calls {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_error_is_reported() {
        let stub = Arc::new(StubTransport::with_deltas(&["par", "tial"]).failing_after(1));
        let app = Blocks::from(tab("llama-v3p1-405b-instruct", &stub, InterfaceOptions::default()));

        let output = run(app, "hi\n").await;
        assert!(output.contains("par\n[error] Stream error: connection reset"));
    }

    #[tokio::test]
    async fn test_empty_app_is_rejected() {
        let mut host = TerminalHost::new(&b""[..], Vec::new());
        assert!(host.launch(Blocks::new()).await.is_err());
    }
}
