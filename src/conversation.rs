//! Owned, append-only conversation history.
//!
//! A [`Conversation`] is passed by `&mut` to whatever drives the model calls.
//! Messages are only ever appended; a tool round (assistant tool-call message
//! plus its results) is appended as a single unit so the history never holds
//! a half-answered request.

use std::collections::HashSet;

use crate::types::message::{Message, MessageRole};
use crate::types::tool::ToolCall;
use crate::{Error, ErrorContext, Result};

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(text)],
        }
    }

    pub fn with_developer(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::developer(text)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Message::user(text));
    }

    /// Append an assistant tool-call message together with its results.
    ///
    /// Every call id in `assistant` must be answered by exactly one result and
    /// no result may reference a foreign id. Nothing is appended on error.
    pub fn record_tool_round(&mut self, assistant: Message, results: Vec<Message>) -> Result<()> {
        if !assistant.has_tool_calls() {
            return Err(Error::validation_with_context(
                "tool round must start with an assistant message carrying tool_calls",
                ErrorContext::new().with_source("conversation"),
            ));
        }

        let expected: Vec<&str> = assistant
            .requested_tool_calls()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        let mut answered: HashSet<&str> = HashSet::new();
        for r in &results {
            let id = match (r.role, r.tool_call_id.as_deref()) {
                (MessageRole::Tool, Some(id)) => id,
                _ => {
                    return Err(Error::validation_with_context(
                        "tool round results must be tool messages with a tool_call_id",
                        ErrorContext::new().with_source("conversation"),
                    ))
                }
            };
            if !expected.contains(&id) || !answered.insert(id) {
                return Err(Error::validation_with_context(
                    format!("tool result '{}' does not answer an outstanding call", id),
                    ErrorContext::new()
                        .with_field_path("tool_call_id")
                        .with_source("conversation"),
                ));
            }
        }

        let missing: Vec<String> = expected
            .iter()
            .filter(|id| !answered.contains(*id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::UnresolvedToolCall { ids: missing });
        }

        self.messages.push(assistant);
        self.messages.extend(results);
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Text of the most recent assistant message that has content.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::Assistant)
            .find_map(|m| m.content.as_deref())
    }

    /// Tool calls, from any assistant message, not answered by a later tool message.
    pub fn unresolved_tool_calls(&self) -> Vec<&ToolCall> {
        let mut pending = Vec::new();
        for (pos, message) in self.messages.iter().enumerate() {
            if !message.has_tool_calls() {
                continue;
            }
            let answered: HashSet<&str> = self.messages[pos + 1..]
                .iter()
                .filter(|m| m.role == MessageRole::Tool)
                .filter_map(|m| m.tool_call_id.as_deref())
                .collect();
            pending.extend(
                message
                    .requested_tool_calls()
                    .iter()
                    .filter(|c| !answered.contains(c.id.as_str())),
            );
        }
        pending
    }

    /// Fail if the history cannot be sent to the model yet.
    pub fn ensure_ready(&self) -> Result<()> {
        let pending = self.unresolved_tool_calls();
        if pending.is_empty() {
            Ok(())
        } else {
            Err(Error::UnresolvedToolCall {
                ids: pending.iter().map(|c| c.id.clone()).collect(),
            })
        }
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_call(id: &str) -> ToolCall {
        ToolCall::function(id, "get_current_weather", r#"{"location":"Paris"}"#)
    }

    #[test]
    fn test_record_tool_round_appends_in_order() {
        let mut conv = Conversation::with_developer("be helpful");
        conv.push_user("weather in Paris?");
        let assistant = Message::assistant_tool_calls(None, vec![weather_call("call_1")]);
        conv.record_tool_round(assistant, vec![Message::tool_result("call_1", "25C")])
            .unwrap();

        let roles: Vec<MessageRole> = conv.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::Developer,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::Tool
            ]
        );
        assert!(conv.ensure_ready().is_ok());
    }

    #[test]
    fn test_record_tool_round_missing_result_leaves_history() {
        let mut conv = Conversation::new();
        conv.push_user("hi");
        let assistant =
            Message::assistant_tool_calls(None, vec![weather_call("call_1"), weather_call("call_2")]);
        let err = conv
            .record_tool_round(assistant, vec![Message::tool_result("call_1", "ok")])
            .unwrap_err();
        match err {
            Error::UnresolvedToolCall { ids } => assert_eq!(ids, vec!["call_2".to_string()]),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(conv.len(), 1);
    }

    #[test]
    fn test_record_tool_round_rejects_duplicate_and_foreign_ids() {
        let mut conv = Conversation::new();
        let assistant = Message::assistant_tool_calls(None, vec![weather_call("call_1")]);
        assert!(conv
            .record_tool_round(
                assistant.clone(),
                vec![
                    Message::tool_result("call_1", "a"),
                    Message::tool_result("call_1", "b")
                ],
            )
            .is_err());
        assert!(conv
            .record_tool_round(assistant, vec![Message::tool_result("call_x", "a")])
            .is_err());
        assert!(conv.is_empty());
    }

    #[test]
    fn test_unresolved_tool_calls_from_manual_pushes() {
        let mut conv = Conversation::new();
        conv.push(Message::assistant_tool_calls(
            None,
            vec![weather_call("call_1"), weather_call("call_2")],
        ));
        conv.push(Message::tool_result("call_2", "done"));

        let pending: Vec<&str> = conv
            .unresolved_tool_calls()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(pending, vec!["call_1"]);
        assert!(matches!(
            conv.ensure_ready(),
            Err(Error::UnresolvedToolCall { .. })
        ));
    }

    #[test]
    fn test_earlier_unanswered_call_blocks_send() {
        let mut conv = Conversation::new();
        conv.push_user("weather in Paris and Oslo?");
        conv.push(Message::assistant_tool_calls(None, vec![weather_call("c1")]));
        conv.push(Message::assistant_tool_calls(None, vec![weather_call("c2")]));
        conv.push(Message::tool_result("c2", "sunny"));

        match conv.ensure_ready() {
            Err(Error::UnresolvedToolCall { ids }) => assert_eq!(ids, vec!["c1".to_string()]),
            other => panic!("unexpected: {:?}", other),
        }

        conv.push(Message::tool_result("c1", "rain"));
        assert!(conv.ensure_ready().is_ok());
    }

    #[test]
    fn test_last_assistant_text_skips_tool_call_messages() {
        let mut conv = Conversation::new();
        conv.push(Message::assistant("first"));
        conv.push(Message::assistant_tool_calls(None, vec![weather_call("c")]));
        conv.push(Message::tool_result("c", "x"));
        assert_eq!(conv.last_assistant_text(), Some("first"));
    }
}
