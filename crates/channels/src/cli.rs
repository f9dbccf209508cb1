//! CLI input: interactive terminal-based chat.
//!
//! Reads one line at a time from any async buffered reader (stdin in
//! production, a byte slice in tests).

use async_trait::async_trait;
use parley_core::channel::InputSource;
use std::io::Write;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::warn;

const PROMPT: &str = "\u{1b}[94mYou\u{1b}[0m: ";

/// Line-oriented input source.
pub struct LineInput<R> {
    lines: Lines<R>,
    prompt: Option<String>,
}

/// The stdin-backed input source used by the binary.
pub type StdinInput = LineInput<BufReader<io::Stdin>>;

impl StdinInput {
    pub fn stdin() -> Self {
        LineInput::new(BufReader::new(io::stdin())).with_prompt(PROMPT)
    }
}

impl<R: AsyncBufRead + Unpin + Send> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            prompt: None,
        }
    }

    /// Print `prompt` to stdout before every read.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    fn show_prompt(&self) {
        if let Some(prompt) = &self.prompt {
            let mut stdout = std::io::stdout();
            let _ = write!(stdout, "{prompt}");
            let _ = stdout.flush();
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> InputSource for LineInput<R> {
    async fn read_line(&mut self) -> Option<String> {
        loop {
            self.show_prompt();
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim_end_matches('\r');
                    if line.trim().is_empty() {
                        continue;
                    }

                    // Check for exit commands
                    if matches!(line.trim(), "exit" | "quit" | "/exit" | "/quit") {
                        return None;
                    }

                    return Some(line.to_string());
                }
                Ok(None) => return None, // EOF (Ctrl+D)
                Err(e) => {
                    warn!(error = %e, "Failed to read input, closing");
                    return None;
                }
            }
        }
    }
}
