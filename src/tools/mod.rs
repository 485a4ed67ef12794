//! Locally executed tools: the registry the orchestrator dispatches through,
//! schema helpers, and the stub weather function.

pub mod registry;
pub mod schema;
pub mod weather;

pub use registry::{ToolHandler, ToolRegistry};
pub use schema::{json_schema_for, typed_definition};
