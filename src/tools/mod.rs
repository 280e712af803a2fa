//! Tool definitions and the registry the agent loop dispatches through.
//!
//! Tools are named, schema-typed callables. The registry preserves
//! registration order (the order tools are listed in the system prompt) and
//! validates arguments against the declared schema before any tool runs.

mod retrieval;

pub use retrieval::{ReadPassage, SearchDocuments};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AgentError;

/// A callable the reasoning step may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, as shown to the model.
    fn name(&self) -> &str;

    /// Natural-language description used for model-side tool selection.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters (OpenAI function format).
    fn parameters_schema(&self) -> Value;

    /// Run the tool with validated arguments.
    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

/// (name, description, schema) triple for prompting the driver.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

/// Registry of available tools.
#[derive(Default)]
pub struct ToolRegistry {
    // Ordered list drives prompt construction; map drives lookup.
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails (leaving the registry unchanged) if the name
    /// is already taken.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), AgentError> {
        let name = tool.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        self.by_name.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, AgentError> {
        self.by_name
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i]))
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptors in registration order, for the system prompt.
    pub fn describe_all(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|t| ToolDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
                schema: t.parameters_schema(),
            })
            .collect()
    }

    /// Tool schemas in the wire format the chat-completions API expects.
    pub fn get_tool_schemas(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.parameters_schema(),
                    }
                })
            })
            .collect()
    }
}

/// Validate `args` against a tool's parameter schema.
///
/// This is a structural check, not a full JSON Schema implementation: the
/// arguments must be an object, every `required` key must be present, and
/// any provided property with a declared primitive type must match it.
pub fn validate_args(schema: &Value, args: &Value) -> Result<(), String> {
    let obj = match args.as_object() {
        Some(o) => o,
        None => return Err(format!("expected a JSON object, got: {}", args)),
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(key) {
                return Err(format!("missing required argument '{}'", key));
            }
        }
    }

    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (key, value) in obj {
            let Some(declared) = props.get(key) else {
                return Err(format!("unexpected argument '{}'", key));
            };
            let Some(expected) = declared.get("type").and_then(Value::as_str) else {
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
                return Err(format!(
                    "argument '{}' should be of type {}, got: {}",
                    key, expected, value
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input back."
        }

        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }

        async fn execute(&self, args: Value) -> anyhow::Result<String> {
            Ok(args["text"].as_str().unwrap_or_default().to_string())
        }
    }

    #[test]
    fn duplicate_registration_leaves_registry_unchanged() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo)).unwrap();
        let err = registry.register(Arc::new(Echo)).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateTool(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("echo").is_ok());
    }

    #[test]
    fn resolve_unknown_tool_fails() {
        let registry = ToolRegistry::new();
        // Arc<dyn Tool> has no Debug impl, so unwrap_err is unavailable.
        let err = registry.resolve("nope").err().unwrap();
        assert!(matches!(err, AgentError::UnknownTool(name) if name == "nope"));
    }

    #[test]
    fn describe_all_preserves_registration_order() {
        struct Named(&'static str);

        #[async_trait]
        impl Tool for Named {
            fn name(&self) -> &str {
                self.0
            }
            fn description(&self) -> &str {
                "test tool"
            }
            fn parameters_schema(&self) -> Value {
                json!({"type": "object", "properties": {}})
            }
            async fn execute(&self, _args: Value) -> anyhow::Result<String> {
                Ok(String::new())
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Named("b"))).unwrap();
        registry.register(Arc::new(Named("a"))).unwrap();
        let names: Vec<_> = registry.describe_all().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn validate_args_checks_required_and_types() {
        let schema = json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "top_k": { "type": "integer" }
            },
            "required": ["query"]
        });

        assert!(validate_args(&schema, &json!({"query": "x"})).is_ok());
        assert!(validate_args(&schema, &json!({"query": "x", "top_k": 3})).is_ok());
        assert!(validate_args(&schema, &json!({})).is_err());
        assert!(validate_args(&schema, &json!({"query": 7})).is_err());
        assert!(validate_args(&schema, &json!({"query": "x", "top_k": "3"})).is_err());
        assert!(validate_args(&schema, &json!("not an object")).is_err());
        assert!(validate_args(&schema, &json!({"query": "x", "bogus": 1})).is_err());
    }
}
