//! Request validation performed before anything goes on the wire.

use std::collections::HashSet;

use super::types::{ChatRequest, ToolChoice};
use crate::types::message::MessageRole;
use crate::{Error, ErrorContext, Result};

pub(crate) fn validate_request(req: &ChatRequest) -> Result<()> {
    if req.model.trim().is_empty() {
        return Err(Error::validation_with_context(
            "model must not be empty",
            ErrorContext::new()
                .with_field_path("request.model")
                .with_source("request_validator"),
        ));
    }
    if req.messages.is_empty() {
        return Err(Error::validation_with_context(
            "request has no messages",
            ErrorContext::new()
                .with_field_path("request.messages")
                .with_source("request_validator"),
        ));
    }

    for (i, m) in req.messages.iter().enumerate() {
        if m.role == MessageRole::Tool && m.tool_call_id.is_none() {
            return Err(Error::validation_with_context(
                "tool message without tool_call_id",
                ErrorContext::new()
                    .with_field_path(format!("request.messages[{}].tool_call_id", i))
                    .with_source("request_validator"),
            ));
        }
    }

    let mut names = HashSet::new();
    for t in req.tools.iter().flatten() {
        if !names.insert(t.name()) {
            return Err(Error::validation_with_context(
                format!("duplicate tool '{}'", t.name()),
                ErrorContext::new()
                    .with_field_path("request.tools")
                    .with_source("request_validator"),
            ));
        }
    }

    match &req.tool_choice {
        Some(ToolChoice::Function(name)) if !names.contains(name.as_str()) => {
            Err(Error::validation_with_context(
                format!("tool_choice names '{}' which is not in tools", name),
                ErrorContext::new()
                    .with_field_path("request.tool_choice")
                    .with_source("request_validator"),
            ))
        }
        Some(ToolChoice::Required) if names.is_empty() => Err(Error::validation_with_context(
            "tool_choice 'required' needs at least one tool",
            ErrorContext::new()
                .with_field_path("request.tool_choice")
                .with_source("request_validator"),
        )),
        _ => Ok(()),
    }
}
