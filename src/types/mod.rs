//! Core data types: chat messages and tool/function calling primitives.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role, nullable content and optional tool calls |
//! | [`MessageRole`] | system, developer, user, assistant, tool |
//! | [`ToolDefinition`] | Function schema sent to the model |
//! | [`ToolCall`] | Function invocation requested by the model |
//! | [`ToolResult`] | Output of a locally executed tool, correlated by call id |
//!
//! ## Example
//!
//! ```rust
//! use ai_toolcall::types::{Message, ToolDefinition};
//!
//! let developer = Message::developer("You are a helpful assistant");
//! let user = Message::user("What's the weather?");
//!
//! let tool = ToolDefinition::function(
//!     "get_current_weather",
//!     "Get current weather for a location",
//!     serde_json::json!({
//!         "type": "object",
//!         "properties": {
//!             "location": {"type": "string"}
//!         }
//!     }),
//! );
//! assert_eq!(tool.name(), "get_current_weather");
//! ```

pub mod message;
pub mod tool;

pub use message::{Message, MessageRole};
pub use tool::{FunctionCall, FunctionDefinition, ToolCall, ToolDefinition, ToolResult};
