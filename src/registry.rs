//! Name → operation registry consumed by the agent driver.
//!
//! Tools come from two sources: the fixed set declared at process start
//! ([`ToolOrigin::Static`]) and the set discovered from an MCP endpoint
//! ([`ToolOrigin::Discovered`]). Names are unique across both; on a
//! collision the statically declared tool wins and the discovered duplicate
//! is dropped with a warning. Registering the same static name twice is a
//! programming error and fails loudly.
//!
//! The registry performs no semantic understanding of request text. Its job
//! is lookup, argument validation against the declared schema, and
//! invocation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

#[derive(Debug)]
pub enum ToolError {
    UnknownTool(String),
    DuplicateTool(String),
    InvalidArguments(String),
    Execution(String),
}

impl fmt::Display for ToolError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ToolError::UnknownTool(name) => write!(f, "unknown tool: {name}"),
            ToolError::DuplicateTool(name) => write!(f, "duplicate tool registration: {name}"),
            ToolError::InvalidArguments(msg) => write!(f, "invalid tool arguments: {msg}"),
            ToolError::Execution(msg) => write!(f, "tool execution failed: {msg}"),
        }
    }
}

impl std::error::Error for ToolError {}

/// An invocable operation.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(
        &self,
        arguments: Value,
    ) -> Result<Value, ToolError>;
}

/// A named, typed, callable unit exposed for agent invocation.
#[derive(Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
    handler: Arc<dyn ToolHandler>,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOrigin {
    Static,
    Discovered,
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, (ToolOrigin, ToolSpec)>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a statically declared tool.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateTool`] when the name is already taken.
    pub fn register_static(
        &mut self,
        spec: ToolSpec,
    ) -> Result<(), ToolError> {
        if self.tools.contains_key(&spec.name) {
            return Err(ToolError::DuplicateTool(spec.name));
        }
        self.tools.insert(spec.name.clone(), (ToolOrigin::Static, spec));
        Ok(())
    }

    /// Registers a discovered tool. Static declarations take precedence: a
    /// name collision drops the discovered tool and returns `false`.
    pub fn register_discovered(
        &mut self,
        spec: ToolSpec,
    ) -> bool {
        if self.tools.contains_key(&spec.name) {
            tracing::warn!(
                "discovered tool '{}' collides with a registered tool; keeping the existing one",
                spec.name
            );
            return false;
        }
        self.tools.insert(spec.name.clone(), (ToolOrigin::Discovered, spec));
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    #[must_use]
    pub fn origin(
        &self,
        name: &str,
    ) -> Option<ToolOrigin> {
        self.tools.get(name).map(|(origin, _)| *origin)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ToolOrigin, &ToolSpec)> {
        self.tools.values().map(|(origin, spec)| (*origin, spec))
    }

    /// The registered set as `genai` tool declarations for the chat request.
    #[must_use]
    pub fn genai_tools(&self) -> Vec<genai::chat::Tool> {
        self.tools
            .values()
            .map(|(_, spec)| {
                genai::chat::Tool::new(spec.name.clone())
                    .with_description(spec.description.clone())
                    .with_schema(spec.parameters.clone())
            })
            .collect()
    }

    /// Looks up a tool by name, validates the arguments against its declared
    /// schema, and invokes it.
    ///
    /// # Errors
    ///
    /// Returns an error when the tool is unknown, the arguments do not
    /// conform to the schema, or the handler fails.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        let (_, spec) = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        validate_arguments(&spec.parameters, &arguments)?;

        tracing::info!("dispatching tool '{name}'");
        spec.handler.call(arguments).await
    }
}

/// Schema conformance check performed before invocation: the arguments must
/// be an object, every `required` field must be present, and every provided
/// field with a declared primitive type must match it.
fn validate_arguments(
    schema: &Value,
    arguments: &Value,
) -> Result<(), ToolError> {
    let Some(args) = arguments.as_object() else {
        return Err(ToolError::InvalidArguments("arguments must be a JSON object".to_string()));
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(field) {
                return Err(ToolError::InvalidArguments(format!("missing required field '{field}'")));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (key, value) in args {
        let Some(expected) = properties.get(key).and_then(|p| p.get("type")).and_then(Value::as_str) else {
            continue;
        };
        let ok = match expected {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            _ => true,
        };
        if !ok {
            return Err(ToolError::InvalidArguments(format!(
                "field '{key}' must be of type {expected}"
            )));
        }
    }

    Ok(())
}
