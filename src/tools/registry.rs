//! Tool registry: the explicit `name -> handler` table consulted when the
//! model requests a function.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::schema::{validate_tool_name, ArgumentValidator};
use crate::types::tool::{ToolCall, ToolDefinition, ToolResult};
use crate::{Error, ErrorContext, Result};

/// A locally executed function. Runs synchronously on the caller's task.
pub trait ToolHandler: Send + Sync {
    fn call(&self, args: &Map<String, Value>) -> Result<Value>;
}

impl<F> ToolHandler for F
where
    F: Fn(&Map<String, Value>) -> Result<Value> + Send + Sync,
{
    fn call(&self, args: &Map<String, Value>) -> Result<Value> {
        self(args)
    }
}

struct RegisteredTool {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
    validator: Option<ArgumentValidator>,
}

/// Registered tools in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique and endpoint-legal; strict
    /// parameter schemas are compiled here so bad schemas fail at startup.
    pub fn register(
        &mut self,
        definition: ToolDefinition,
        handler: impl ToolHandler + 'static,
    ) -> Result<()> {
        let name = definition.name().to_string();
        validate_tool_name(&name)?;
        if self.index.contains_key(&name) {
            return Err(Error::configuration_with_context(
                format!("tool '{}' is already registered", name),
                ErrorContext::new().with_source("tool_registry"),
            ));
        }

        let validator = match (&definition.function.parameters, definition.is_strict()) {
            (Some(params), true) => Some(ArgumentValidator::compile(&name, params)?),
            _ => None,
        };

        debug!(tool = %name, strict = definition.is_strict(), "registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(RegisteredTool {
            definition,
            handler: Arc::new(handler),
            validator,
        });
        Ok(())
    }

    /// Register a handler that takes typed arguments and returns any serializable value.
    ///
    /// The definition is taken as given; use [`typed_definition`](super::typed_definition)
    /// to derive it from `A`.
    pub fn register_typed<A, R, F>(&mut self, definition: ToolDefinition, f: F) -> Result<()>
    where
        A: DeserializeOwned,
        R: Serialize,
        F: Fn(A) -> Result<R> + Send + Sync + 'static,
    {
        let name = definition.name().to_string();
        let handler = move |args: &Map<String, Value>| -> Result<Value> {
            let typed: A = serde_json::from_value(Value::Object(args.clone()))
                .map_err(|e| Error::malformed(&name, e.to_string()))?;
            Ok(serde_json::to_value(f(typed)?)?)
        };
        self.register(definition, handler)
    }

    /// Builder-style variant of [`ToolRegistry::register`].
    pub fn with_tool(
        mut self,
        definition: ToolDefinition,
        handler: impl ToolHandler + 'static,
    ) -> Result<Self> {
        self.register(definition, handler)?;
        Ok(self)
    }

    /// Schemas to send with a request, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.definition.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute one model-requested call and wrap the output with its correlation id.
    pub fn dispatch(&self, call: &ToolCall) -> Result<ToolResult> {
        let name = call.name();
        let tool = match self.index.get(name) {
            Some(&i) => &self.tools[i],
            None => {
                warn!(tool = %name, call_id = %call.id, "model requested an unregistered tool");
                return Err(Error::UnknownFunction {
                    name: name.to_string(),
                });
            }
        };

        let args = call.decode_arguments()?;
        if let Some(validator) = &tool.validator {
            validator.check(name, &args)?;
        }

        debug!(tool = %name, call_id = %call.id, "dispatching tool call");
        let content = tool.handler.call(&args).map_err(|e| {
            if e.is_tool_error() {
                e
            } else {
                Error::ToolExecution {
                    function: name.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(ToolResult {
            tool_call_id: call.id.clone(),
            name: name.to_string(),
            content,
        })
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
