//! The agent loop: the heart of Parley.
//!
//! The loop alternates between the operator and the model:
//!
//! 1. **Read** a line from the input source and append it
//! 2. **Infer**: send the whole conversation and the tool catalogue to the model
//! 3. **If tool uses**: run the batch, append the results, go back to step 2
//! 4. **If text only**: show it and go back to step 1
//!
//! The operator is only prompted once the model has nothing left to run.

pub mod dispatcher;
pub mod loop_runner;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use dispatcher::ToolDispatcher;
pub use loop_runner::AgentLoop;
