//! Scripted in-memory backend shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use ai_toolcall::client::{ChatBackend, ChatRequest, ChatResponse, Choice, FinishReason, Usage};
use ai_toolcall::types::message::MessageRole;
use ai_toolcall::{Message, Result, ToolCall};
use async_trait::async_trait;

type Responder = Box<dyn Fn(&ChatRequest) -> ChatResponse + Send + Sync>;

/// Replies from a queue of responders and records every request it sees.
pub struct ScriptedBackend {
    model: String,
    script: Mutex<VecDeque<Responder>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn then(self, f: impl Fn(&ChatRequest) -> ChatResponse + Send + Sync + 'static) -> Self {
        self.script.lock().unwrap().push_back(Box::new(f));
        self
    }

    pub fn then_reply(self, response: ChatResponse) -> Self {
        self.then(move |_| response.clone())
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let responder = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted backend ran out of responses");
        Ok(responder(request))
    }
}

pub fn usage(prompt: u64, completion: u64) -> Usage {
    Usage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: prompt + completion,
    }
}

fn response(message: Message, finish_reason: FinishReason) -> ChatResponse {
    ChatResponse {
        id: "chatcmpl-test".to_string(),
        model: "gpt-4o-mini".to_string(),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason: Some(finish_reason),
        }],
        usage: Some(usage(10, 5)),
    }
}

pub fn text_reply(content: &str) -> ChatResponse {
    response(Message::assistant(content), FinishReason::Stop)
}

/// Assistant reply requesting the given `(id, name, arguments)` calls.
pub fn tool_call_reply(calls: &[(&str, &str, &str)]) -> ChatResponse {
    let calls = calls
        .iter()
        .map(|(id, name, args)| ToolCall::function(*id, *name, *args))
        .collect();
    response(
        Message::assistant_tool_calls(None, calls),
        FinishReason::ToolCalls,
    )
}

/// Answer built from the latest tool message in the request, the way a model
/// would summarize the weather report it was handed.
pub fn summarize_weather(request: &ChatRequest) -> ChatResponse {
    let report: serde_json::Value = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::Tool)
        .and_then(|m| m.content.as_deref())
        .and_then(|c| serde_json::from_str(c).ok())
        .unwrap_or_default();
    text_reply(&format!(
        "It is currently {} degrees and {} in {}.",
        report["temperature"],
        report["condition"].as_str().unwrap_or("unknown"),
        report["location"].as_str().unwrap_or("somewhere"),
    ))
}
