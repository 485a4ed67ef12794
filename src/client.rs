//! Chat-completion client interface.
//!
//! Keep the public surface small and predictable: one backend trait, one HTTP
//! implementation, and the request/response wire types.

pub mod backend;
pub mod builder;
pub mod core;
mod error_classification;
pub mod types;
mod validation;

pub use backend::ChatBackend;
pub use builder::HttpChatClientBuilder;
pub use self::core::HttpChatClient;
pub use types::{ChatRequest, ChatResponse, Choice, FinishReason, ToolChoice, Usage};
