//! # Parley Core
//!
//! Domain types, traits, and error definitions for the Parley tool-using
//! chat loop. This crate has **zero framework dependencies**: it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the loop (model backend, input source, display,
//! tool handlers) is a trait here. Implementations live in their respective
//! crates, which keeps the loop testable with scripted stand-ins.

pub mod agent;
pub mod channel;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentConfig, AgentState};
pub use channel::{DisplaySink, InputSource, NullDisplay};
pub use error::{Error, ProviderError, RegistryError, Result, ToolError};
pub use message::{ContentBlock, Conversation, ConversationId, Message, Role, ToolUse};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use tool::{FieldType, SchemaField, ToolHandler, ToolRegistry, ToolSpec, handler_fn};
