//! The agent loop state machine.

use crate::dispatcher::ToolDispatcher;
use parley_core::agent::{AgentConfig, AgentState};
use parley_core::channel::{DisplaySink, InputSource};
use parley_core::error::Error;
use parley_core::message::{Conversation, Message, ToolUse};
use parley_core::provider::{Provider, ProviderRequest};
use parley_core::tool::ToolRegistry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Drives one conversation between an operator, a model and a set of tools.
///
/// The loop owns its [`Conversation`] outright. Every transition either
/// appends one whole message or nothing at all.
pub struct AgentLoop {
    /// The model backend
    provider: Arc<dyn Provider>,

    /// Tool catalogue advertised to the model on every request
    tools: Arc<ToolRegistry>,

    /// Runs tool batches against `tools`
    dispatcher: ToolDispatcher,

    /// Where operator lines come from
    input: Box<dyn InputSource>,

    /// Where model text goes
    display: Arc<dyn DisplaySink>,

    /// Model, token budget, system prompt, tool deadline
    config: AgentConfig,

    conversation: Conversation,
    state: AgentState,
    cancel: CancellationToken,

    /// Model requests issued so far
    turns: u64,
}

impl AgentLoop {
    /// Create a loop in the `AwaitingUserInput` state with an empty conversation.
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        input: Box<dyn InputSource>,
        display: Arc<dyn DisplaySink>,
        config: AgentConfig,
    ) -> Self {
        let dispatcher = ToolDispatcher::new(tools.clone(), display.clone())
            .with_timeout(config.tool_timeout());
        Self {
            provider,
            tools,
            dispatcher,
            input,
            display,
            config,
            conversation: Conversation::new(),
            state: AgentState::AwaitingUserInput,
            cancel: CancellationToken::new(),
            turns: 0,
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels this loop when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run until input closes (`Ok`) or the run fails.
    ///
    /// Provider failures and cancellation end the run; the conversation keeps
    /// everything appended before the failing step.
    pub async fn run(&mut self) -> Result<(), Error> {
        info!(
            conversation_id = %self.conversation.id(),
            provider = self.provider.name(),
            model = %self.config.model,
            tools = self.tools.len(),
            "Starting conversation"
        );

        while !self.state.is_terminated() {
            if let Err(e) = self.step().await {
                warn!(
                    conversation_id = %self.conversation.id(),
                    messages = self.conversation.len(),
                    error = %e,
                    "Conversation ended with error"
                );
                return Err(e);
            }
        }

        info!(
            conversation_id = %self.conversation.id(),
            messages = self.conversation.len(),
            turns = self.turns,
            "Conversation finished"
        );
        Ok(())
    }

    /// Perform exactly one state transition.
    ///
    /// On error the loop is left `Terminated`.
    pub async fn step(&mut self) -> Result<(), Error> {
        let state = std::mem::replace(&mut self.state, AgentState::Terminated);
        if state.is_terminated() {
            return Ok(());
        }
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        self.state = match state {
            AgentState::AwaitingUserInput => self.await_input().await?,
            AgentState::Inferring => self.infer().await?,
            AgentState::DispatchingTools(batch) => self.dispatch(batch).await?,
            AgentState::Terminated => AgentState::Terminated,
        };
        Ok(())
    }

    async fn await_input(&mut self) -> Result<AgentState, Error> {
        let cancel = self.cancel.clone();
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            line = self.input.read_line() => line,
        };

        match line {
            Some(text) => {
                debug!(conversation_id = %self.conversation.id(), "Operator input received");
                self.conversation.push(Message::user(text));
                Ok(AgentState::Inferring)
            }
            None => {
                debug!(conversation_id = %self.conversation.id(), "Input closed");
                Ok(AgentState::Terminated)
            }
        }
    }

    async fn infer(&mut self) -> Result<AgentState, Error> {
        self.turns += 1;
        let request = ProviderRequest {
            model: self.config.model.clone(),
            system: self.config.system_prompt.clone(),
            messages: self.conversation.snapshot().to_vec(),
            tools: self.tools.specs(),
            max_tokens: self.config.max_tokens,
        };

        debug!(
            conversation_id = %self.conversation.id(),
            turn = self.turns,
            messages = request.messages.len(),
            "Requesting model turn"
        );

        let cancel = self.cancel.clone();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = self.provider.complete(request) => response?,
        };

        if let Some(usage) = &response.usage {
            debug!(
                conversation_id = %self.conversation.id(),
                turn = self.turns,
                model = %response.model,
                stop_reason = response.stop_reason.as_deref().unwrap_or("-"),
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Model turn complete"
            );
        }
        if response.content.is_empty() {
            warn!(
                conversation_id = %self.conversation.id(),
                turn = self.turns,
                "Model returned no content"
            );
        }

        let message = Message::assistant(response.content);
        for text in message.texts() {
            self.display.assistant_text(text);
        }
        let tool_uses = message.tool_uses();
        self.conversation.push(message);

        if tool_uses.is_empty() {
            Ok(AgentState::AwaitingUserInput)
        } else {
            Ok(AgentState::DispatchingTools(tool_uses))
        }
    }

    async fn dispatch(&mut self, batch: Vec<ToolUse>) -> Result<AgentState, Error> {
        info!(
            conversation_id = %self.conversation.id(),
            turn = self.turns,
            tool_count = batch.len(),
            "Executing tool calls"
        );

        let results = self.dispatcher.execute_all(&batch, &self.cancel).await?;
        debug_assert_eq!(results.len(), batch.len());
        self.conversation.push(Message::tool_results(results));
        Ok(AgentState::Inferring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use async_trait::async_trait;
    use parley_core::error::{ProviderError, ToolError};
    use parley_core::message::{ContentBlock, Role};
    use parley_core::provider::ProviderResponse;
    use parley_core::tool::{ToolSpec, handler_fn};
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn echo_registry() -> Arc<ToolRegistry> {
        Arc::new(registry_with(vec![(
            ToolSpec::new("echo", "Echo the input back"),
            handler_fn(|input| Ok(input["text"].as_str().unwrap_or_default().to_string())),
        )]))
    }

    fn agent(provider: Arc<dyn Provider>, input: ScriptedInput) -> AgentLoop {
        AgentLoop::new(
            provider,
            echo_registry(),
            Box::new(input),
            Arc::new(RecordingDisplay::default()),
            AgentConfig::new("mock-model"),
        )
    }

    /// A provider that never answers.
    struct StalledProvider;

    #[async_trait]
    impl Provider for StalledProvider {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn starts_awaiting_input_with_empty_conversation() {
        let provider = Arc::new(SequentialMockProvider::new(vec![]));
        let agent = agent(provider, ScriptedInput::new(&[]));
        assert_eq!(agent.state(), &AgentState::AwaitingUserInput);
        assert!(agent.conversation().is_empty());
    }

    #[tokio::test]
    async fn simple_text_response() {
        let provider = Arc::new(SequentialMockProvider::new(vec![make_text_response(
            "Hello! How can I help?",
        )]));
        let display = Arc::new(RecordingDisplay::default());
        let mut agent = AgentLoop::new(
            provider.clone(),
            echo_registry(),
            Box::new(ScriptedInput::new(&["Hello!"])),
            display.clone(),
            AgentConfig::new("mock-model"),
        );

        agent.run().await.unwrap();

        assert_eq!(agent.state(), &AgentState::Terminated);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(display.events(), vec!["Claude: Hello! How can I help?"]);

        let messages = agent.conversation().snapshot();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::user("Hello!"));
        assert_eq!(messages[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn steps_walk_the_state_machine() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_response(vec![ContentBlock::tool_use("t1", "echo", json!({"text": "hi"}))]),
            make_text_response("done"),
        ]));
        let mut agent = agent(provider, ScriptedInput::new(&["go"]));

        agent.step().await.unwrap();
        assert_eq!(agent.state(), &AgentState::Inferring);

        agent.step().await.unwrap();
        assert!(matches!(agent.state(), AgentState::DispatchingTools(batch) if batch.len() == 1));

        agent.step().await.unwrap();
        assert_eq!(agent.state(), &AgentState::Inferring);
        assert_eq!(
            agent.conversation().last().unwrap().content,
            vec![ContentBlock::tool_result("t1", "hi")]
        );

        agent.step().await.unwrap();
        assert_eq!(agent.state(), &AgentState::AwaitingUserInput);

        agent.step().await.unwrap();
        assert_eq!(agent.state(), &AgentState::Terminated);

        // Terminated is absorbing.
        agent.step().await.unwrap();
        assert_eq!(agent.state(), &AgentState::Terminated);
    }

    #[tokio::test]
    async fn request_carries_config_and_tools() {
        let provider = Arc::new(SequentialMockProvider::new(vec![make_text_response("ok")]));
        let mut config = AgentConfig::new("claude-test");
        config.max_tokens = 2048;
        config.system_prompt = Some("be brief".into());

        let mut agent = AgentLoop::new(
            provider.clone(),
            echo_registry(),
            Box::new(ScriptedInput::new(&["hi"])),
            Arc::new(RecordingDisplay::default()),
            config,
        );
        agent.run().await.unwrap();

        let request = &provider.requests()[0];
        assert_eq!(request.model, "claude-test");
        assert_eq!(request.max_tokens, 2048);
        assert_eq!(request.system.as_deref(), Some("be brief"));
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.tools[0].name, "echo");
        assert_eq!(request.messages, vec![Message::user("hi")]);
    }

    #[tokio::test]
    async fn tool_round_trip_does_not_prompt() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_response(vec![
                ContentBlock::text("Let me check."),
                ContentBlock::tool_use("t1", "echo", json!({"text": "one"})),
                ContentBlock::tool_use("t2", "echo", json!({"text": "two"})),
            ]),
            make_text_response("Both echoed."),
        ]));
        let input = ScriptedInput::new(&["echo twice"]);
        let reads = input.reads();
        let mut agent = agent(provider.clone(), input);

        agent.run().await.unwrap();

        // One real line plus the final EOF; no prompt between tool turns.
        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert_eq!(provider.call_count(), 2);

        let messages = agent.conversation().snapshot();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].role, Role::User);
        assert_eq!(
            messages[2].content,
            vec![
                ContentBlock::tool_result("t1", "one"),
                ContentBlock::tool_result("t2", "two"),
            ]
        );

        // The second request saw the tool results.
        assert_eq!(provider.requests()[1].messages.len(), 3);
    }

    #[tokio::test]
    async fn provider_failure_ends_run_without_appending() {
        let provider = Arc::new(SequentialMockProvider::with_outcomes(vec![Err(
            ProviderError::Network("connection reset".into()),
        )]));
        let mut agent = agent(provider, ScriptedInput::new(&["hello"]));

        let err = agent.run().await.unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::Network(_))));
        assert_eq!(agent.state(), &AgentState::Terminated);
        assert_eq!(agent.conversation().snapshot(), &[Message::user("hello")]);
    }

    #[tokio::test]
    async fn tool_error_is_reported_to_model() {
        let tools = Arc::new(registry_with(vec![(
            ToolSpec::new("fail", "always fails"),
            handler_fn(|_| Err(ToolError::failed("fail", "permission denied"))),
        )]));
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_response(vec![ContentBlock::tool_use("t1", "fail", json!({}))]),
            make_text_response("That failed."),
        ]));
        let mut agent = AgentLoop::new(
            provider,
            tools,
            Box::new(ScriptedInput::new(&["try it"])),
            Arc::new(RecordingDisplay::default()),
            AgentConfig::new("mock-model"),
        );

        agent.run().await.unwrap();
        assert_eq!(
            agent.conversation().snapshot()[2].content,
            vec![ContentBlock::tool_error("t1", "permission denied")]
        );
    }

    #[tokio::test]
    async fn cancel_while_inferring_appends_nothing() {
        let mut agent = agent(Arc::new(StalledProvider), ScriptedInput::new(&["hello"]));
        let token = agent.cancellation_token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = agent.run().await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert_eq!(agent.state(), &AgentState::Terminated);
        assert_eq!(agent.conversation().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_before_start_reads_nothing() {
        let input = ScriptedInput::new(&["hello"]);
        let reads = input.reads();
        let token = CancellationToken::new();
        token.cancel();

        let mut agent = agent(Arc::new(SequentialMockProvider::new(vec![])), input)
            .with_cancellation(token);

        assert!(matches!(agent.run().await, Err(Error::Cancelled)));
        assert_eq!(reads.load(Ordering::SeqCst), 0);
        assert!(agent.conversation().is_empty());
    }
}
