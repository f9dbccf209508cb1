//! Shared test helpers for loop and dispatcher tests.

use async_trait::async_trait;
use parley_core::channel::{DisplaySink, InputSource};
use parley_core::error::ProviderError;
use parley_core::message::ContentBlock;
use parley_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use parley_core::tool::{ToolHandler, ToolRegistry, ToolSpec};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A mock provider that returns a sequence of scripted outcomes.
///
/// Each call to `complete` pops the next outcome and records the request.
/// Panics if more calls are made than outcomes provided.
pub struct SequentialMockProvider {
    outcomes: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::with_outcomes(responses.into_iter().map(Ok).collect())
    }

    pub fn with_outcomes(outcomes: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let call = requests.len();
        requests.push(request);

        self.outcomes.lock().unwrap().pop_front().unwrap_or_else(|| {
            panic!("SequentialMockProvider: no more responses (call #{call})")
        })
    }
}

/// Input that replays fixed lines, then reports EOF.
pub struct ScriptedInput {
    lines: VecDeque<String>,
    reads: Arc<AtomicUsize>,
}

impl ScriptedInput {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of `read_line` calls (including the final EOF).
    pub fn reads(&self) -> Arc<AtomicUsize> {
        self.reads.clone()
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn read_line(&mut self) -> Option<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.lines.pop_front()
    }
}

/// Display sink that records what it was shown, in order.
#[derive(Default)]
pub struct RecordingDisplay {
    events: Mutex<Vec<String>>,
}

impl RecordingDisplay {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl DisplaySink for RecordingDisplay {
    fn assistant_text(&self, text: &str) {
        self.events.lock().unwrap().push(format!("Claude: {text}"));
    }

    fn tool_invocation(&self, name: &str, input: &serde_json::Value) {
        self.events.lock().unwrap().push(format!("tool: {name}({input})"));
    }
}

pub fn registry_with(tools: Vec<(ToolSpec, Arc<dyn ToolHandler>)>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for (spec, handler) in tools {
        registry.register(spec, handler).unwrap();
    }
    registry
}

/// Create a response holding the given blocks.
pub fn make_response(content: Vec<ContentBlock>) -> ProviderResponse {
    ProviderResponse {
        content,
        model: "mock-model".into(),
        stop_reason: None,
        usage: Some(Usage {
            input_tokens: 10,
            output_tokens: 5,
        }),
    }
}

/// Create a simple text response (no tool uses).
pub fn make_text_response(text: &str) -> ProviderResponse {
    make_response(vec![ContentBlock::text(text)])
}
