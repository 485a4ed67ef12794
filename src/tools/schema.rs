//! Schema utilities for tool definitions.

use jsonschema::{Draft, JSONSchema};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::types::tool::ToolDefinition;
use crate::{Error, ErrorContext, Result};

static TOOL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").expect("static pattern"));

/// Function names accepted by OpenAI-compatible endpoints.
pub fn validate_tool_name(name: &str) -> Result<()> {
    if TOOL_NAME.is_match(name) {
        Ok(())
    } else {
        Err(Error::configuration_with_context(
            format!("invalid tool name '{}'", name),
            ErrorContext::new()
                .with_field_path("function.name")
                .with_details("expected 1-64 characters from [a-zA-Z0-9_-]")
                .with_source("tool_registry"),
        ))
    }
}

/// JSON schema for `T`, trimmed to what a function `parameters` field expects.
pub fn json_schema_for<T: schemars::JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    let mut value = serde_json::to_value(&schema).unwrap_or_else(|_| json!({}));
    if let Value::Object(map) = &mut value {
        map.remove("$schema");
        map.remove("title");
    }
    value
}

/// Build a function definition whose parameters are derived from `T`.
pub fn typed_definition<T: schemars::JsonSchema>(
    name: impl Into<String>,
    description: impl Into<String>,
) -> ToolDefinition {
    ToolDefinition::function(name, description, json_schema_for::<T>())
}

/// Compiled parameter schema used to check arguments of strict tools.
pub struct ArgumentValidator {
    schema: JSONSchema,
}

impl ArgumentValidator {
    pub fn compile(function: &str, parameters: &Value) -> Result<Self> {
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(parameters)
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid parameter schema for '{}'", function),
                    ErrorContext::new()
                        .with_field_path("function.parameters")
                        .with_details(e.to_string())
                        .with_source("tool_registry"),
                )
            })?;
        Ok(Self { schema })
    }

    /// Validate decoded arguments, reporting at most three violations.
    pub fn check(&self, function: &str, args: &Map<String, Value>) -> Result<()> {
        let instance = Value::Object(args.clone());
        let outcome = match self.schema.validate(&instance) {
            Ok(()) => Ok(()),
            Err(errors) => {
                let msgs: Vec<String> = errors
                    .take(3)
                    .map(|e| format!("{} at {}", e, e.instance_path))
                    .collect();
                Err(msgs.join("; "))
            }
        };
        outcome.map_err(|reason| Error::malformed(function, reason))
    }
}
