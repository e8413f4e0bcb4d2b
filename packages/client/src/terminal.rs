//! Terminal host: readline input thread and a printing [`ChatView`].

use std::io::Write;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    domain::StatusIndicator, error::ClientError, formatter::MessageFormatter,
    message::DisplayEntry, session::InputEvent, view::ChatView,
};

const PROMPT: &str = "> ";
const NAME_COMMAND: &str = "/name";
const QUIT_COMMAND: &str = "/quit";

/// Translate one line typed at the prompt into input events.
///
/// * `/name <name>` edits the username field
/// * `/quit` ends the session
/// * anything else is typed into the message field and submitted
pub fn parse_input_line(line: &str) -> Vec<InputEvent> {
    let trimmed = line.trim_start();

    if trimmed.trim_end() == QUIT_COMMAND {
        return vec![InputEvent::Quit];
    }
    if let Some(rest) = trimmed.strip_prefix(NAME_COMMAND)
        && (rest.is_empty() || rest.starts_with(char::is_whitespace))
    {
        return vec![InputEvent::UsernameChanged(rest.to_string())];
    }

    vec![
        InputEvent::MessageChanged(line.to_string()),
        InputEvent::Submit,
    ]
}

/// Spawn the blocking readline thread feeding `inputs`.
///
/// Fails when the terminal editor cannot be initialized.
pub fn spawn_input_thread(
    inputs: mpsc::UnboundedSender<InputEvent>,
) -> Result<std::thread::JoinHandle<()>, ClientError> {
    let (ready_tx, ready_rx) = std::sync::mpsc::channel();

    let handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => {
                let _ = ready_tx.send(Ok(()));
                rl
            }
            Err(e) => {
                let _ = ready_tx.send(Err(e.to_string()));
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str()).ok();
                    }
                    let mut quit = false;
                    for event in parse_input_line(&line) {
                        quit |= event == InputEvent::Quit;
                        if inputs.send(event).is_err() {
                            // Session is gone
                            return;
                        }
                    }
                    if quit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    let _ = inputs.send(InputEvent::Quit);
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    let _ = inputs.send(InputEvent::Quit);
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    let _ = inputs.send(InputEvent::Quit);
                    break;
                }
            }
        }
    });

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(reason)) => Err(ClientError::Terminal(reason)),
        Err(_) => Err(ClientError::Terminal(
            "input thread exited before the editor was ready".to_string(),
        )),
    }
}

/// Prints session output to stdout, above the readline prompt
#[derive(Debug, Default)]
pub struct TerminalView {
    controls_enabled: Option<bool>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn print(&self, text: &str) {
        print!("{}", text);
        redisplay_prompt();
    }
}

impl ChatView for TerminalView {
    fn set_status(&mut self, status: StatusIndicator) {
        self.print(&MessageFormatter::format_status(status));
    }

    fn append_entry(&mut self, entry: &DisplayEntry) {
        self.print(&MessageFormatter::format_entry(entry));
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        // Only announce changes
        if self.controls_enabled == Some(enabled) {
            return;
        }
        self.controls_enabled = Some(enabled);
        self.print(&MessageFormatter::format_controls(enabled));
    }

    fn clear_message_input(&mut self) {
        // readline has already consumed the line
    }
}

/// Redisplay the prompt after printing output
fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}
