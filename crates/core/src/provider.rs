//! Provider trait: the abstraction over the inference backend.
//!
//! A Provider knows how to send a conversation to a model and get the
//! response content blocks back. The agent loop treats it as opaque: model
//! identifiers and token budgets are passed through untouched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::{ContentBlock, Message};
use crate::tool::ToolSpec;

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "claude-opus-4-5-20251101")
    pub model: String,

    /// Optional system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// The conversation so far
    pub messages: Vec<Message>,

    /// Tools the model may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Ordered content blocks produced by the model
    pub content: Vec<ContentBlock>,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Why generation stopped ("end_turn", "tool_use", "max_tokens", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ProviderResponse {
    /// A response with the given blocks and no metadata.
    pub fn from_blocks(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            model: String::new(),
            stop_reason: None,
            usage: None,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The core Provider trait.
///
/// The agent loop calls `complete()` without knowing which backend is in use.
/// A failed call must not have produced any partial output visible to the
/// caller.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{FieldType, SchemaField};

    #[test]
    fn request_serialization_skips_empty_optionals() {
        let req = ProviderRequest {
            model: "test-model".into(),
            system: None,
            messages: vec![Message::user("hi")],
            tools: vec![],
            max_tokens: 1024,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("tools").is_none());
        assert_eq!(json["max_tokens"], 1024);
    }

    #[test]
    fn request_carries_tool_specs() {
        let req = ProviderRequest {
            model: "test-model".into(),
            system: Some("be brief".into()),
            messages: vec![],
            tools: vec![ToolSpec::new("read_file", "Read a file").field(
                SchemaField::required("path", FieldType::String, "Path"),
            )],
            max_tokens: 16,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("read_file"));
        assert!(json.contains("be brief"));
    }
}
