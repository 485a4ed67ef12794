//! # ai-toolcall
//!
//! Tool-call round trips against OpenAI-compatible chat-completion APIs.
//!
//! ## Overview
//!
//! The model is given a set of function schemas. When it asks for a call, the
//! arguments are decoded, the matching local function runs, its result goes
//! back into the conversation correlated by call id, and the model is asked
//! again until it answers in plain text.
//!
//! - **Explicit registry**: [`tools::ToolRegistry`] maps function names to
//!   handlers, built once at startup.
//! - **Owned history**: [`Conversation`] is an append-only value passed by
//!   `&mut`; a failed tool round leaves it untouched.
//! - **Pluggable backend**: [`client::ChatBackend`] abstracts the endpoint;
//!   [`client::HttpChatClient`] is the reqwest implementation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_toolcall::client::HttpChatClient;
//! use ai_toolcall::tools::{weather, ToolRegistry};
//! use ai_toolcall::{Conversation, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> ai_toolcall::Result<()> {
//!     let client = HttpChatClient::from_env()?;
//!
//!     let mut registry = ToolRegistry::new();
//!     weather::register(&mut registry)?;
//!
//!     let orchestrator = Orchestrator::new(client, registry);
//!     let mut conversation = Conversation::with_developer("You are a helpful assistant.");
//!     let answer = orchestrator
//!         .ask(&mut conversation, "What's the weather like in Paris?")
//!         .await?;
//!     println!("{}", answer.content);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Messages, tool definitions, tool calls and results |
//! | [`conversation`] | Append-only conversation state |
//! | [`tools`] | Tool registry, schema helpers, stub weather tool |
//! | [`client`] | Backend trait, HTTP client, wire types |
//! | [`orchestrator`] | The round-trip loop |
//! | [`config`] | Defaults, YAML files, environment overrides |

pub mod client;
pub mod config;
pub mod conversation;
pub mod orchestrator;
pub mod tools;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{ChatBackend, HttpChatClient, HttpChatClientBuilder};
pub use config::ClientConfig;
pub use conversation::Conversation;
pub use orchestrator::{Orchestrator, OrchestratorOptions, RoundTrip, Turn};
pub use types::{
    message::{Message, MessageRole},
    tool::{ToolCall, ToolDefinition},
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
