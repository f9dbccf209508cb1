//! Tool dispatcher: runs one batch of tool invocations and hands back the
//! matching batch of results.
//!
//! Handlers run concurrently on a `JoinSet`. Each task is tagged with its
//! batch index and its result lands in that slot, so the output order is
//! the request order no matter which handler finishes first.
//!
//! Nothing a single handler does can fail the batch: unknown names, handler
//! errors, timeouts and panics all come back as error-flagged results. The
//! only way out early is cancellation, which discards the whole batch.

use futures::FutureExt;
use parley_core::channel::DisplaySink;
use parley_core::error::{Error, ToolError};
use parley_core::message::{ContentBlock, ToolUse};
use parley_core::tool::{ToolHandler, ToolRegistry};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Executes tool batches against a shared registry.
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    display: Arc<dyn DisplaySink>,
    timeout: Option<Duration>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, display: Arc<dyn DisplaySink>) -> Self {
        Self {
            registry,
            display,
            timeout: None,
        }
    }

    /// Bound every handler call by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run every invocation in `batch` and return one `ToolResult` block per
    /// entry, in the same order, each tagged with its request id.
    ///
    /// Returns [`Error::Cancelled`] if `cancel` fires before the batch is
    /// complete. No partial results are returned in that case.
    pub async fn execute_all(
        &self,
        batch: &[ToolUse],
        cancel: &CancellationToken,
    ) -> Result<Vec<ContentBlock>, Error> {
        let mut slots: Vec<Option<ContentBlock>> = vec![None; batch.len()];
        let mut workers = JoinSet::new();

        for (idx, call) in batch.iter().enumerate() {
            let handler = match self.registry.lookup(&call.name) {
                Ok(handler) => handler,
                Err(e) => {
                    warn!(tool = %call.name, tool_use_id = %call.id, "Unknown tool requested");
                    slots[idx] = Some(ContentBlock::tool_error(&call.id, e.to_string()));
                    continue;
                }
            };

            self.display.tool_invocation(&call.name, &call.input);

            let name = call.name.clone();
            let input = call.input.clone();
            let timeout = self.timeout;
            workers.spawn(async move { (idx, invoke(handler, &name, input, timeout).await) });
        }

        while !workers.is_empty() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    // Dropping the set aborts whatever is still running.
                    warn!(pending = workers.len(), "Tool batch cancelled");
                    return Err(Error::Cancelled);
                }
                joined = workers.join_next() => match joined {
                    Some(Ok((idx, outcome))) => {
                        slots[idx] = Some(into_result(&batch[idx], outcome));
                    }
                    Some(Err(e)) => error!(error = %e, "Tool worker failed to join"),
                    None => break,
                },
            }
        }

        Ok(slots
            .into_iter()
            .zip(batch)
            .map(|(slot, call)| {
                slot.unwrap_or_else(|| ContentBlock::tool_error(&call.id, "tool worker failed"))
            })
            .collect())
    }
}

/// Call one handler, folding timeouts and panics into `ToolError`s.
async fn invoke(
    handler: Arc<dyn ToolHandler>,
    name: &str,
    input: serde_json::Value,
    timeout: Option<Duration>,
) -> Result<String, ToolError> {
    let start = Instant::now();
    let call = AssertUnwindSafe(handler.call(input)).catch_unwind();

    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(tool = %name, timeout_ms = limit.as_millis() as u64, "Tool timed out");
                return Err(ToolError::Timeout {
                    tool_name: name.to_string(),
                    timeout: limit,
                });
            }
        },
        None => call.await,
    };

    let result = outcome.unwrap_or_else(|_| {
        error!(tool = %name, "Tool handler panicked");
        Err(ToolError::failed(name, "tool panicked"))
    });

    debug!(
        tool = %name,
        success = result.is_ok(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Tool finished"
    );
    result
}

fn into_result(call: &ToolUse, outcome: Result<String, ToolError>) -> ContentBlock {
    match outcome {
        Ok(output) => ContentBlock::tool_result(&call.id, output),
        Err(e) => {
            warn!(tool = %call.name, tool_use_id = %call.id, error = %e, "Tool execution failed");
            ContentBlock::tool_error(&call.id, e.to_string())
        }
    }
}
