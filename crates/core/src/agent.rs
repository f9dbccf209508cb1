//! Agent configuration and state types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed per-run settings handed to the agent loop at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model identifier passed verbatim to the provider
    pub model: String,

    /// Maximum output tokens per model turn
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Optional system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Per-tool deadline in seconds (`None` = no deadline)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_timeout_secs: Option<u64>,
}

fn default_max_tokens() -> u32 {
    1024
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: default_max_tokens(),
            system_prompt: None,
            tool_timeout_secs: None,
        }
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_secs.map(Duration::from_secs)
    }
}

/// Where the agent loop currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentState {
    /// Waiting for the operator to type something
    AwaitingUserInput,
    /// A request to the model is about to be (or being) made
    Inferring,
    /// The last model turn asked for tools; results are owed
    DispatchingTools(Vec<crate::message::ToolUse>),
    /// Absorbing end state
    Terminated,
}

impl AgentState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}
