//! Tool abstraction and registry. Every tool execution produces a
//! `ToolResult` envelope; failures are data handed back to the model, not
//! errors that abort the conversation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

pub mod escalation;
pub mod knowledge_base;
pub mod orders;

/// Outcome envelope for a single tool execution.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolResult {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(data: Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }

    /// JSON form fed back to the model as the tool message body.
    pub fn to_value(&self) -> Value {
        let mut value = json!({ "success": self.success });
        if let Some(data) = &self.data {
            value["data"] = data.clone();
        }
        if let Some(error) = &self.error {
            value["error"] = Value::String(error.clone());
        }
        value
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON Schema for the tool's arguments object.
    fn parameters(&self) -> Value;

    async fn execute(&self, arguments: Value) -> ToolResult;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, Arc<dyn Tool>>,
    order: Vec<&'static str>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        let name = tool.name();
        if self.tools.insert(name, Arc::new(tool)).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Function-declaration schemas in registration order.
    pub fn schemas(&self) -> Vec<Value> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters(),
                    },
                })
            })
            .collect()
    }

    /// Dispatches by name. An unknown tool name is a failed result, so the
    /// model can recover in its next turn.
    pub async fn execute(&self, name: &str, arguments: Value) -> ToolResult {
        match self.get(name) {
            Some(tool) => tool.execute(arguments).await,
            None => ToolResult::fail(format!("Tool '{name}' not found")),
        }
    }
}

/// Pulls a required string argument, as a failed-result error when absent.
pub(crate) fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, ToolResult> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ToolResult::fail(format!("Missing required parameter '{key}'")))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::{Tool, ToolRegistry, ToolResult};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echoes its arguments"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, arguments: Value) -> ToolResult {
            ToolResult::ok(arguments)
        }
    }

    #[tokio::test]
    async fn unknown_tool_name_is_a_failed_result() {
        let registry = ToolRegistry::new();
        let result = registry.execute("get_order", json!({})).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Tool 'get_order' not found"));
    }

    #[tokio::test]
    async fn registered_tools_dispatch_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let result = registry.execute("echo", json!({"a": 1})).await;
        assert!(result.success);
        assert_eq!(result.data, Some(json!({"a": 1})));
    }

    #[test]
    fn schemas_carry_the_function_wrapper() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let schemas = registry.schemas();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0]["type"], "function");
        assert_eq!(schemas[0]["function"]["name"], "echo");
    }

    #[test]
    fn failure_envelope_includes_error_only() {
        let value = ToolResult::fail("boom").to_value();
        assert_eq!(value, json!({"success": false, "error": "boom"}));

        let value = ToolResult::ok(json!({"found": true})).to_value();
        assert_eq!(value, json!({"success": true, "data": {"found": true}}));
    }
}
