//! Error types for the Parley domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] wraps them all.
//!
//! Only two classes ever end a run: [`ProviderError`] (the model could not be
//! reached or answered garbage) and [`Error::Cancelled`]. Tool-level failures
//! are turned into error-flagged tool results and handed back to the model.

use std::time::Duration;
use thiserror::Error;

/// The top-level error type for all Parley operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Registry construction ---
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // --- Cooperative cancellation ---
    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the inference backend. All of these are fatal for the
/// current run and are never retried internally.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures resolving or running a single tool. These never unwind the loop.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("tool not found")]
    NotFound(String),

    #[error("{reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("tool timed out after {}s", secs(.timeout))]
    Timeout { tool_name: String, timeout: Duration },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

impl ToolError {
    /// Shorthand for a handler-reported failure.
    pub fn failed(tool_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Seconds as printed in timeout messages: `2s`, `0.25s`.
fn secs(d: &Duration) -> f64 {
    d.as_secs_f64()
}

/// Startup-time errors while composing the tool registry.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("Duplicate tool name: {0}")]
    DuplicateToolName(String),
}
