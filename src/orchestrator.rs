//! Tool-call round-trip orchestration.
//!
//! One loop: ask → tool calls → local execution → re-ask, until the model
//! answers in plain text or the iteration bound is hit. The orchestrator owns
//! the backend and the tool registry; the conversation is borrowed per call so
//! callers keep full control of the history between turns.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::client::{ChatBackend, ChatRequest, FinishReason, ToolChoice, Usage};
use crate::conversation::Conversation;
use crate::tools::ToolRegistry;
use crate::types::message::{Message, MessageRole};
use crate::types::tool::{ToolCall, ToolResult};
use crate::{Error, ErrorContext, Result};

/// Knobs for the round-trip loop.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Maximum model calls per [`Orchestrator::run`], including the final answer.
    pub max_iterations: usize,
    /// Tool choice for calls answering a user turn. Calls that follow tool
    /// results use the endpoint default.
    pub tool_choice: Option<ToolChoice>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            tool_choice: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl OrchestratorOptions {
    pub fn from_config(config: &crate::config::ClientConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            tool_choice: None,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Outcome of a single model call.
#[derive(Debug, Clone)]
pub enum Turn {
    /// Plain-text answer; already appended to the conversation.
    Final {
        content: String,
        finish_reason: Option<FinishReason>,
        usage: Option<Usage>,
    },
    /// The model wants tools run; nothing has been appended yet.
    ToolCalls(PendingToolCalls),
}

/// An assistant tool-call message waiting for its results.
#[derive(Debug, Clone)]
pub struct PendingToolCalls {
    assistant: Message,
    pub usage: Option<Usage>,
}

impl PendingToolCalls {
    pub fn calls(&self) -> &[ToolCall] {
        self.assistant.requested_tool_calls()
    }

    pub fn assistant_message(&self) -> &Message {
        &self.assistant
    }
}

/// Summary of a completed [`Orchestrator::run`].
#[derive(Debug, Clone)]
pub struct RoundTrip {
    pub content: String,
    pub model_calls: usize,
    /// Every tool call executed during the run, in execution order.
    pub tool_calls: Vec<ToolCall>,
    pub usage: Usage,
}

pub struct Orchestrator<B> {
    backend: B,
    registry: ToolRegistry,
    options: OrchestratorOptions,
}

impl<B: ChatBackend> Orchestrator<B> {
    /// Options start from the backend's configuration when it has one.
    pub fn new(backend: B, registry: ToolRegistry) -> Self {
        let options = backend
            .client_config()
            .map(OrchestratorOptions::from_config)
            .unwrap_or_default();
        Self {
            backend,
            registry,
            options,
        }
    }

    pub fn with_options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    fn build_request(
        &self,
        conversation: &Conversation,
        with_tools: bool,
        tool_choice: Option<ToolChoice>,
    ) -> ChatRequest {
        let mut req = ChatRequest::new(self.backend.model(), conversation.messages().to_vec());
        if with_tools && !self.registry.is_empty() {
            req = req.tools(self.registry.definitions());
            // Forced choice only in reply to a user turn, never after tool results.
            let answering_user =
                matches!(conversation.last(), Some(m) if m.role == MessageRole::User);
            if let (Some(choice), true) = (tool_choice, answering_user) {
                req = req.tool_choice(choice);
            }
        }
        if let Some(t) = self.options.temperature {
            req = req.temperature(t);
        }
        if let Some(m) = self.options.max_tokens {
            req = req.max_tokens(m);
        }
        req
    }

    /// Baseline completion without tools. The reply is appended and its text returned.
    pub async fn complete(&self, conversation: &mut Conversation) -> Result<String> {
        conversation.ensure_ready()?;
        let req = self.build_request(conversation, false, None);
        let choice = self.backend.chat(&req).await?.into_first_choice()?;
        let mut message = choice.message;
        if message.has_tool_calls() {
            return Err(Error::validation_with_context(
                "model requested tools in a call made without tools",
                ErrorContext::new().with_source("orchestrator"),
            ));
        }
        message.tool_calls = None;
        let content = message.content_text().to_string();
        conversation.push(message);
        Ok(content)
    }

    /// One model call with the registered tools attached.
    pub async fn step(&self, conversation: &mut Conversation) -> Result<Turn> {
        conversation.ensure_ready()?;
        let req = self.build_request(conversation, true, self.options.tool_choice.clone());
        let resp = self.backend.chat(&req).await?;
        let usage = resp.usage;
        let choice = resp.into_first_choice()?;
        let mut message = choice.message;

        if message.has_tool_calls() {
            info!(
                tool_calls = message.requested_tool_calls().len(),
                "model requested tool calls"
            );
            return Ok(Turn::ToolCalls(PendingToolCalls {
                assistant: message,
                usage,
            }));
        }

        match &choice.finish_reason {
            None | Some(FinishReason::Stop) => {}
            Some(other) => warn!(finish_reason = ?other, "answer ended early"),
        }

        // An empty tool_calls array is dropped so the history stays sendable.
        message.tool_calls = None;
        let content = message.content_text().to_string();
        conversation.push(message);
        Ok(Turn::Final {
            content,
            finish_reason: choice.finish_reason,
            usage,
        })
    }

    /// Run every pending call, then append the assistant message and one tool
    /// message per call. Nothing is appended unless every call succeeds.
    pub fn resolve(
        &self,
        conversation: &mut Conversation,
        pending: PendingToolCalls,
    ) -> Result<Vec<ToolResult>> {
        let mut seen = HashSet::new();
        if let Some(dup) = pending.calls().iter().find(|c| !seen.insert(c.id.as_str())) {
            return Err(Error::validation_with_context(
                format!("model reused tool call id '{}'", dup.id),
                ErrorContext::new()
                    .with_field_path("tool_calls.id")
                    .with_source("orchestrator"),
            ));
        }

        let results = pending
            .calls()
            .iter()
            .map(|call| self.registry.dispatch(call))
            .collect::<Result<Vec<_>>>()?;

        let messages = results
            .iter()
            .cloned()
            .map(ToolResult::into_message)
            .collect::<Result<Vec<_>>>()?;

        conversation.record_tool_round(pending.assistant, messages)?;
        debug!(results = results.len(), "tool results appended");
        Ok(results)
    }

    /// Drive the conversation until the model answers in plain text.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<RoundTrip> {
        let limit = self.options.max_iterations;
        let mut usage = Usage::default();
        let mut executed: Vec<ToolCall> = Vec::new();

        for call_no in 1..=limit {
            match self.step(conversation).await? {
                Turn::Final {
                    content,
                    usage: u,
                    ..
                } => {
                    if let Some(u) = u {
                        usage.merge(&u);
                    }
                    return Ok(RoundTrip {
                        content,
                        model_calls: call_no,
                        tool_calls: executed,
                        usage,
                    });
                }
                Turn::ToolCalls(pending) => {
                    if let Some(u) = &pending.usage {
                        usage.merge(u);
                    }
                    if call_no == limit {
                        // No model call left to consume the results.
                        break;
                    }
                    let calls = pending.calls().to_vec();
                    self.resolve(conversation, pending)?;
                    executed.extend(calls);
                }
            }
        }

        warn!(limit, "tool loop hit the iteration bound");
        Err(Error::MaxIterationsExceeded { limit })
    }

    /// Append a user turn and run it to a final answer.
    pub async fn ask(
        &self,
        conversation: &mut Conversation,
        text: impl Into<String>,
    ) -> Result<RoundTrip> {
        conversation.push_user(text);
        self.run(conversation).await
    }
}
