//! Terminal display sink.

use parley_core::channel::DisplaySink;
use std::io::{IsTerminal, Write};
use std::sync::Mutex;

const ASSISTANT_LABEL: &str = "\u{1b}[93mClaude\u{1b}[0m";
const TOOL_LABEL: &str = "\u{1b}[92mtool\u{1b}[0m";

/// Writes model text and tool invocations to a terminal-like writer.
pub struct TerminalDisplay<W = std::io::Stdout> {
    out: Mutex<W>,
    color: bool,
}

impl TerminalDisplay {
    /// Colored labels only when stdout is a terminal.
    pub fn stdout() -> Self {
        let out = std::io::stdout();
        let color = out.is_terminal();
        Self::new(out).with_color(color)
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn label<'a>(&self, colored: &'a str, plain: &'a str) -> &'a str {
        if self.color { colored } else { plain }
    }

    fn emit(&self, line: String) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

impl<W: Write + Send> DisplaySink for TerminalDisplay<W> {
    fn assistant_text(&self, text: &str) {
        let label = self.label(ASSISTANT_LABEL, "Claude");
        self.emit(format!("{label}: {text}"));
    }

    fn tool_invocation(&self, name: &str, input: &serde_json::Value) {
        let label = self.label(TOOL_LABEL, "tool");
        self.emit(format!("{label}: {name}({input})"));
    }
}
