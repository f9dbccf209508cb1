//! The operator-facing seams: where input comes from and where output goes.
//!
//! The loop never touches stdin or stdout directly. A terminal, a script
//! or a network connection can all sit behind these traits.

use async_trait::async_trait;

/// A source of operator input, one line at a time.
#[async_trait]
pub trait InputSource: Send {
    /// Read the next line. `None` means input is closed and the loop should
    /// terminate cleanly.
    async fn read_line(&mut self) -> Option<String>;
}

/// Receives everything the operator should see, in order.
///
/// Purely observational: nothing a sink does can feed back into the loop.
pub trait DisplaySink: Send + Sync {
    /// A text block produced by the model.
    fn assistant_text(&self, text: &str);

    /// A tool is about to be invoked.
    fn tool_invocation(&self, name: &str, input: &serde_json::Value);
}

/// A sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn assistant_text(&self, _text: &str) {}

    fn tool_invocation(&self, _name: &str, _input: &serde_json::Value) {}
}
