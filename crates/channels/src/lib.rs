//! Operator-facing channels for Parley.
//!
//! - **cli**: line input from stdin with a `You:` prompt
//! - **terminal**: colored display of model text and tool invocations

pub mod cli;
pub mod terminal;

pub use cli::{LineInput, StdinInput};
pub use terminal::TerminalDisplay;
