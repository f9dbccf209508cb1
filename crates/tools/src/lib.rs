//! Built-in tool implementations for Parley.
//!
//! Tools give the model the ability to interact with the filesystem:
//! read files, list directories, and edit or create files.

pub mod edit_file;
pub mod list_files;
pub mod read_file;

use parley_core::error::{RegistryError, ToolError};
use parley_core::tool::ToolRegistry;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use edit_file::EditFileTool;
pub use list_files::ListFilesTool;
pub use read_file::ReadFileTool;

/// Create a registry with all built-in tools, resolving relative paths
/// against the process working directory.
pub fn default_registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(ReadFileTool::spec(), Arc::new(ReadFileTool::new()))?;
    registry.register(ListFilesTool::spec(), Arc::new(ListFilesTool::new()))?;
    registry.register(EditFileTool::spec(), Arc::new(EditFileTool::new()))?;
    Ok(registry)
}

/// Same as [`default_registry`], rooted at `root`.
pub fn registry_in(root: impl AsRef<Path>) -> Result<ToolRegistry, RegistryError> {
    let root = root.as_ref();
    let mut registry = ToolRegistry::new();
    registry.register(ReadFileTool::spec(), Arc::new(ReadFileTool::in_dir(root)))?;
    registry.register(ListFilesTool::spec(), Arc::new(ListFilesTool::in_dir(root)))?;
    registry.register(EditFileTool::spec(), Arc::new(EditFileTool::in_dir(root)))?;
    Ok(registry)
}

/// Decode a tool's raw input into its typed form.
pub(crate) fn parse_input<T: DeserializeOwned>(input: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

pub(crate) fn resolve(root: Option<&Path>, path: &str) -> PathBuf {
    match root {
        Some(root) => root.join(path),
        None => PathBuf::from(path),
    }
}
