use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::{info, warn};
use uuid::Uuid;

use super::backend::ChatBackend;
use super::error_classification::remote_error;
use super::types::{ChatRequest, ChatResponse};
use super::validation::validate_request;
use crate::config::ClientConfig;
use crate::transport::HttpTransport;
use crate::types::message::Message;
use crate::Result;

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct HttpChatClient {
    pub(crate) config: ClientConfig,
    pub(crate) transport: Arc<HttpTransport>,
}

impl HttpChatClient {
    /// Client configured from defaults and `AI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        crate::client::builder::HttpChatClientBuilder::new().build()
    }

    pub fn builder() -> crate::client::builder::HttpChatClientBuilder {
        crate::client::builder::HttpChatClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Request pre-filled with the configured model and sampling knobs.
    pub fn request(&self, messages: Vec<Message>) -> ChatRequest {
        let mut req = ChatRequest::new(self.config.model.clone(), messages);
        if let Some(t) = self.config.temperature {
            req = req.temperature(t);
        }
        if let Some(m) = self.config.max_tokens {
            req = req.max_tokens(m);
        }
        req
    }

    fn header_first(headers: &HeaderMap, names: &[&str]) -> Option<String> {
        for name in names {
            if let Some(v) = headers.get(*name) {
                if let Ok(s) = v.to_str() {
                    let s = s.trim();
                    if !s.is_empty() {
                        return Some(s.to_string());
                    }
                }
            }
        }
        None
    }

    /// Only the `Retry-After: <seconds>` form is understood.
    fn retry_after_ms(headers: &HeaderMap) -> Option<u32> {
        let raw = Self::header_first(headers, &["retry-after"])?;
        let secs: u32 = raw.parse().ok()?;
        Some(secs.saturating_mul(1000))
    }
}

#[async_trait]
impl ChatBackend for HttpChatClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    fn client_config(&self) -> Option<&ClientConfig> {
        Some(&self.config)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let mut request = request.clone();
        if request.temperature.is_none() {
            request.temperature = self.config.temperature;
        }
        if request.max_tokens.is_none() {
            request.max_tokens = self.config.max_tokens;
        }
        let request = &request;
        validate_request(request)?;

        let request_id = Uuid::new_v4().to_string();
        let body = serde_json::to_value(request)?;
        let started = Instant::now();

        let resp = self
            .transport
            .post_json(CHAT_COMPLETIONS_PATH, &body, &request_id)
            .await?;
        let status = resp.status();
        let retry_after_ms = Self::retry_after_ms(resp.headers());
        let text = resp
            .text()
            .await
            .map_err(|e| crate::Error::Transport(crate::transport::TransportError::Http(e)))?;
        let duration_ms = started.elapsed().as_millis() as u64;

        if !status.is_success() {
            warn!(
                request_id = %request_id,
                status = status.as_u16(),
                duration_ms,
                "chat completion failed"
            );
            return Err(remote_error(status.as_u16(), retry_after_ms, &text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        info!(
            request_id = %request_id,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tool_count(),
            choices = parsed.choices.len(),
            duration_ms,
            "chat completion"
        );
        Ok(parsed)
    }
}
