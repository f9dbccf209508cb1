//! `edit_file`: search/replace editing, or file creation.
//!
//! `old_str` must match exactly once. An empty `old_str` against a missing
//! file creates it (and its parent directories) with `new_str` as content.

use async_trait::async_trait;
use parley_core::error::ToolError;
use parley_core::tool::{FieldType, SchemaField, ToolHandler, ToolSpec};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{parse_input, resolve};

pub const NAME: &str = "edit_file";

#[derive(Debug, Deserialize)]
struct EditFileInput {
    path: String,
    old_str: String,
    new_str: String,
}

pub struct EditFileTool {
    pub root: Option<PathBuf>,
}

impl EditFileTool {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn spec() -> ToolSpec {
        ToolSpec::new(
            NAME,
            "Make edits to a text file.\n\n\
             Replaces 'old_str' with 'new_str' in the given file. 'old_str' and 'new_str' MUST \
             be different from each other.\n\n\
             If the file specified with path doesn't exist, it will be created.",
        )
        .field(SchemaField::required(
            "path",
            FieldType::String,
            "The path to the file",
        ))
        .field(SchemaField::required(
            "old_str",
            FieldType::String,
            "Text to search for - must match exactly and must only have one match exactly",
        ))
        .field(SchemaField::required(
            "new_str",
            FieldType::String,
            "Text to replace old_str with",
        ))
    }

    async fn create(full: &Path, rel_path: &str, content: &str) -> Result<String, ToolError> {
        if let Some(parent) = full.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::failed(NAME, e))?;
        }
        tokio::fs::write(full, content)
            .await
            .map_err(|e| ToolError::failed(NAME, e))?;
        debug!(path = %rel_path, bytes = content.len(), "Created file");
        Ok(format!("Successfully created file {rel_path}"))
    }
}

impl Default for EditFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for EditFileTool {
    async fn call(&self, input: serde_json::Value) -> Result<String, ToolError> {
        let EditFileInput {
            path,
            old_str,
            new_str,
        } = parse_input(input)?;

        if path.is_empty() || old_str == new_str {
            return Err(ToolError::InvalidArguments("Invalid input parameters".into()));
        }

        let full = resolve(self.root.as_deref(), &path);

        let content = match tokio::fs::read_to_string(&full).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && old_str.is_empty() => {
                return Self::create(&full, &path, &new_str).await;
            }
            Err(e) => return Err(ToolError::failed(NAME, e)),
        };

        if old_str.is_empty() {
            return Err(ToolError::InvalidArguments(
                "old_str must not be empty when editing an existing file".into(),
            ));
        }

        match content.matches(old_str.as_str()).count() {
            0 => return Err(ToolError::failed(NAME, "old_str not found in file")),
            1 => {}
            n => {
                return Err(ToolError::failed(
                    NAME,
                    format!("old_str matches {n} times; it must match exactly once"),
                ));
            }
        }

        let updated = content.replacen(old_str.as_str(), &new_str, 1);
        tokio::fs::write(&full, updated)
            .await
            .map_err(|e| ToolError::failed(NAME, e))?;
        debug!(path = %path, "Edited file");
        Ok("OK".into())
    }
}
