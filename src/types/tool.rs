//! Tool calling definitions (OpenAI-compatible function calling).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Tool definition (for function calling)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String, // "function"
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>, // JSON Schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl ToolDefinition {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: Some(description.into()),
                parameters: Some(parameters),
                strict: None,
            },
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.function.strict = Some(strict);
        self
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn is_strict(&self) -> bool {
        self.function.strict.unwrap_or(false)
    }
}

/// Tool call (invocation requested by the model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, exactly as emitted by the model.
    #[serde(default)]
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

impl ToolCall {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: function_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Decode the arguments string into a key/value map.
    ///
    /// Blank input decodes to an empty map; anything that is not a JSON
    /// object is rejected.
    pub fn decode_arguments(&self) -> Result<Map<String, Value>> {
        let raw = self.function.arguments.trim();
        if raw.is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(Error::malformed(
                self.name(),
                format!("expected a JSON object, got {}", json_kind(&other)),
            )),
            Err(e) => Err(Error::malformed(self.name(), e.to_string())),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Tool result (response to tool call)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub name: String,
    pub content: Value,
}

impl ToolResult {
    /// Render the result as message content: strings verbatim, everything else as compact JSON.
    pub fn content_string(&self) -> Result<String> {
        match &self.content {
            Value::String(s) => Ok(s.clone()),
            other => Ok(serde_json::to_string(other)?),
        }
    }

    pub fn into_message(self) -> Result<crate::types::message::Message> {
        let content = self.content_string()?;
        Ok(crate::types::message::Message::tool_result(
            self.tool_call_id,
            content,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_arguments_object() {
        let call = ToolCall::function(
            "call_1",
            "get_current_weather",
            r#"{"location": "Paris", "unit": "celsius"}"#,
        );
        let args = call.decode_arguments().unwrap();
        assert_eq!(args.get("location"), Some(&json!("Paris")));
        assert_eq!(args.get("unit"), Some(&json!("celsius")));
    }

    #[test]
    fn test_decode_arguments_blank_is_empty() {
        let call = ToolCall::function("call_1", "now", "  ");
        assert!(call.decode_arguments().unwrap().is_empty());
    }

    #[test]
    fn test_decode_arguments_rejects_garbage() {
        let call = ToolCall::function("call_1", "f", "{location: Paris");
        match call.decode_arguments() {
            Err(Error::MalformedArguments { function, .. }) => assert_eq!(function, "f"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decode_arguments_rejects_non_object() {
        let call = ToolCall::function("call_1", "f", "[1, 2]");
        let err = call.decode_arguments().unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_tool_call_type_defaults_to_function() {
        let call: ToolCall = serde_json::from_value(json!({
            "id": "call_2",
            "function": {"name": "f", "arguments": "{}"}
        }))
        .unwrap();
        assert_eq!(call.call_type, "function");
    }

    #[test]
    fn test_definition_wire_shape() {
        let def = ToolDefinition::function(
            "get_current_weather",
            "Get the current weather",
            json!({"type": "object", "properties": {}}),
        )
        .strict(true);
        let v = serde_json::to_value(&def).unwrap();
        assert_eq!(v["type"], "function");
        assert_eq!(v["function"]["name"], "get_current_weather");
        assert_eq!(v["function"]["strict"], true);
    }

    #[test]
    fn test_result_content_string() {
        let r = ToolResult {
            tool_call_id: "call_1".into(),
            name: "f".into(),
            content: json!({"temperature": 25, "condition": "sunny"}),
        };
        assert_eq!(
            r.content_string().unwrap(),
            r#"{"condition":"sunny","temperature":25}"#
        );

        let s = ToolResult {
            content: json!("plain"),
            ..r
        };
        assert_eq!(s.content_string().unwrap(), "plain");
    }
}
