use std::sync::Arc;

use async_trait::async_trait;

use super::types::{ChatRequest, ChatResponse};
use crate::config::ClientConfig;
use crate::Result;

/// Anything that can answer a chat-completion request.
///
/// [`crate::client::HttpChatClient`] talks to a real endpoint; tests plug in
/// scripted implementations.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Model identifier placed in outgoing requests.
    fn model(&self) -> &str;

    /// Configuration the backend was built from, if any. The orchestrator
    /// takes its loop bound and sampling defaults from it.
    fn client_config(&self) -> Option<&ClientConfig> {
        None
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    fn model(&self) -> &str {
        (**self).model()
    }

    fn client_config(&self) -> Option<&ClientConfig> {
        (**self).client_config()
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        (**self).chat(request).await
    }
}
