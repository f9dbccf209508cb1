//! Tool specs, handlers and the registry that maps one to the other.
//!
//! Tools are what give the model the ability to act in the world: read and
//! edit files, list directories. Each tool is a [`ToolSpec`] (what the model
//! is told) paired with a [`ToolHandler`] (what actually runs).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{RegistryError, ToolError};

/// JSON type tag of a tool input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

/// One declared input field of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldType,
    pub description: String,
    pub required: bool,
}

impl SchemaField {
    pub fn required(
        name: impl Into<String>,
        kind: FieldType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        kind: FieldType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// What the model is told about a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique name, matched exactly and case-sensitively
    pub name: String,

    /// When and why to use the tool
    pub description: String,

    /// Declared input fields, in display order
    pub fields: Vec<SchemaField>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    /// Add an input field.
    pub fn field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    /// Render the declared fields as a JSON Schema object.
    pub fn input_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        for f in &self.fields {
            properties.insert(
                f.name.clone(),
                serde_json::json!({
                    "type": f.kind,
                    "description": f.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// The executable half of a tool.
///
/// Handlers validate their own input: anything malformed must come back as
/// `ToolError::InvalidArguments`, never a panic.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, input: serde_json::Value) -> Result<String, ToolError>;
}

/// Adapter turning a plain closure into a [`ToolHandler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F> ToolHandler for FnHandler<F>
where
    F: Fn(serde_json::Value) -> Result<String, ToolError> + Send + Sync,
{
    async fn call(&self, input: serde_json::Value) -> Result<String, ToolError> {
        (self.0)(input)
    }
}

/// Wrap a synchronous closure as a shared handler.
pub fn handler_fn<F>(f: F) -> Arc<dyn ToolHandler>
where
    F: Fn(serde_json::Value) -> Result<String, ToolError> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

struct RegisteredTool {
    spec: ToolSpec,
    handler: Arc<dyn ToolHandler>,
}

/// A registry of available tools.
///
/// Built once at startup, then shared behind an `Arc` and never mutated, so
/// dispatch workers read it concurrently without locking.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register(
        &mut self,
        spec: ToolSpec,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        if self.by_name.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateToolName(spec.name));
        }
        debug!(tool = %spec.name, fields = spec.fields.len(), "Registered tool");
        self.by_name.insert(spec.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool { spec, handler });
        Ok(())
    }

    /// Resolve a tool name to its handler.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn ToolHandler>, ToolError> {
        self.by_name
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i].handler))
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// All tool specs in registration order (for sending to the model).
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec.clone()).collect()
    }

    /// All registered tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.spec.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_spec() -> ToolSpec {
        ToolSpec::new("echo", "Echoes back the input").field(SchemaField::required(
            "text",
            FieldType::String,
            "Text to echo",
        ))
    }

    fn echo_handler() -> Arc<dyn ToolHandler> {
        handler_fn(|input| {
            input["text"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ToolError::InvalidArguments("Missing 'text' argument".into()))
        })
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_spec(), echo_handler()).unwrap();
        assert!(registry.lookup("echo").is_ok());
        assert!(matches!(
            registry.lookup("nonexistent"),
            Err(ToolError::NotFound(_))
        ));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_spec(), echo_handler()).unwrap();
        assert!(registry.lookup("Echo").is_err());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_spec(), echo_handler()).unwrap();
        let err = registry.register(echo_spec(), echo_handler()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateToolName(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn specs_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(ToolSpec::new(name, "test"), echo_handler())
                .unwrap();
        }
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.specs()[1].name, "alpha");
    }

    #[test]
    fn input_schema_rendering() {
        let spec = echo_spec().field(SchemaField::optional(
            "times",
            FieldType::Integer,
            "Repeat count",
        ));
        let schema = spec.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["text"]["type"], "string");
        assert_eq!(schema["properties"]["times"]["type"], "integer");
        assert_eq!(schema["required"], serde_json::json!(["text"]));
    }

    #[tokio::test]
    async fn handler_fn_executes() {
        let handler = echo_handler();
        let out = handler
            .call(serde_json::json!({"text": "hello world"}))
            .await
            .unwrap();
        assert_eq!(out, "hello world");

        let err = handler.call(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
