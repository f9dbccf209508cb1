//! `read_file`: return the contents of a file.

use async_trait::async_trait;
use parley_core::error::ToolError;
use parley_core::tool::{FieldType, SchemaField, ToolHandler, ToolSpec};
use serde::Deserialize;
use std::path::PathBuf;

use crate::{parse_input, resolve};

pub const NAME: &str = "read_file";

#[derive(Debug, Deserialize)]
struct ReadFileInput {
    path: String,
}

pub struct ReadFileTool {
    /// Directory relative paths are resolved against. `None` = process cwd.
    pub root: Option<PathBuf>,
}

impl ReadFileTool {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Resolve relative paths against `root` instead of the working directory.
    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn spec() -> ToolSpec {
        ToolSpec::new(
            NAME,
            "Read the contents of a given relative file path. Use this when you want to see \
             what's inside a file. Do not use this with directory names.",
        )
        .field(SchemaField::required(
            "path",
            FieldType::String,
            "The relative path of a file in the working directory.",
        ))
    }
}

impl Default for ReadFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for ReadFileTool {
    async fn call(&self, input: serde_json::Value) -> Result<String, ToolError> {
        let ReadFileInput { path } = parse_input(input)?;
        let full = resolve(self.root.as_deref(), &path);

        tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| ToolError::failed(NAME, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definition() {
        let spec = ReadFileTool::spec();
        assert_eq!(spec.name, "read_file");
        let schema = spec.input_schema();
        assert_eq!(schema["required"], serde_json::json!(["path"]));
        assert!(schema["properties"]["path"].is_object());
    }

    #[tokio::test]
    async fn read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("foo.txt"), "Hello, world!\n").unwrap();

        let tool = ReadFileTool::in_dir(dir.path());
        let out = tool
            .call(serde_json::json!({ "path": "foo.txt" }))
            .await
            .unwrap();
        assert_eq!(out, "Hello, world!\n");
    }

    #[tokio::test]
    async fn read_nonexistent_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ReadFileTool::in_dir(dir.path());
        let err = tool
            .call(serde_json::json!({ "path": "missing.txt" }))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
        let io_err = std::fs::read_to_string(dir.path().join("missing.txt")).unwrap_err();
        assert_eq!(err.to_string(), io_err.to_string());
    }

    #[tokio::test]
    async fn missing_path_argument() {
        let tool = ReadFileTool::new();
        let err = tool.call(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn wrong_argument_type_does_not_panic() {
        let tool = ReadFileTool::new();
        let err = tool.call(serde_json::json!({ "path": 42 })).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        let err = tool.call(serde_json::json!("foo.txt")).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
