//! Inference provider implementations for Parley.
//!
//! All providers implement the `parley_core::Provider` trait.

pub mod anthropic;

pub use anthropic::AnthropicProvider;
