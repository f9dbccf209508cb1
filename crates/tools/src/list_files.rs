//! `list_files`: recursive directory listing.

use async_trait::async_trait;
use ignore::WalkBuilder;
use parley_core::error::ToolError;
use parley_core::tool::{FieldType, SchemaField, ToolHandler, ToolSpec};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{parse_input, resolve};

pub const NAME: &str = "list_files";

#[derive(Debug, Default, Deserialize)]
struct ListFilesInput {
    #[serde(default)]
    path: Option<String>,
}

pub struct ListFilesTool {
    pub root: Option<PathBuf>,
}

impl ListFilesTool {
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
            "List files and directories at a given path. If no path is provided, lists files \
             in the current directory.",
        )
        .field(SchemaField::optional(
            "path",
            FieldType::String,
            "Optional relative path to list files from. \
             Defaults to current directory if not provided.",
        ))
    }
}

impl Default for ListFilesTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk `dir` depth-first, collecting paths relative to it.
/// Directories carry a trailing `/`. Siblings are sorted by name.
///
/// Nothing is filtered: hidden files and ignore-file entries are listed too.
fn walk(dir: &Path) -> Result<Vec<String>, ignore::Error> {
    std::fs::metadata(dir)?;

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        if entry.file_type().is_some_and(|ft| ft.is_dir()) {
            files.push(format!("{rel}/"));
        } else {
            files.push(rel);
        }
    }
    Ok(files)
}

#[async_trait]
impl ToolHandler for ListFilesTool {
    async fn call(&self, input: serde_json::Value) -> Result<String, ToolError> {
        // A bare `{}` or `null` both mean "current directory".
        let ListFilesInput { path } = if input.is_null() {
            ListFilesInput::default()
        } else {
            parse_input(input)?
        };
        let dir = resolve(self.root.as_deref(), path.as_deref().unwrap_or("."));

        let files = tokio::task::spawn_blocking(move || walk(&dir))
            .await
            .map_err(|e| ToolError::failed(NAME, e))?
            .map_err(|e| ToolError::failed(NAME, e))?;
        debug!(entries = files.len(), "Listed files");

        serde_json::to_string(&files).map_err(|e| ToolError::failed(NAME, e))
    }
}
