//! HTTP transport for the chat-completion endpoint.

pub mod http;

pub use http::{HttpTransport, TransportError};
