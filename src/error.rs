use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.base_url", "messages[3].tool_calls")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "tool_registry")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the tool-call runtime.
///
/// The tool-related variants are fatal to the current turn; callers get the
/// conversation back exactly as it was before the failing call.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown function requested by model: {name}")]
    UnknownFunction { name: String },

    #[error("Malformed arguments for function '{function}': {reason}")]
    MalformedArguments { function: String, reason: String },

    #[error("Tool '{function}' failed: {message}")]
    ToolExecution { function: String, message: String },

    #[error("Unresolved tool call(s): {}", ids.join(", "))]
    UnresolvedToolCall { ids: Vec<String> },

    #[error("Tool loop did not finish within {limit} model calls")]
    MaxIterationsExceeded { limit: usize },

    #[error("Model returned no choices")]
    EmptyResponse,

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote error: HTTP {status} ({class}): {message}")]
    Remote {
        status: u16,
        class: String,
        message: String,
        retryable: bool,
        retry_after_ms: Option<u32>,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub(crate) fn malformed(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedArguments {
            function: function.into(),
            reason: reason.into(),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// True for the errors raised while dispatching a model-requested tool call.
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownFunction { .. }
                | Error::MalformedArguments { .. }
                | Error::ToolExecution { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_rendered_in_display() {
        let err = Error::configuration_with_context(
            "base_url is not a valid URL",
            ErrorContext::new()
                .with_field_path("config.base_url")
                .with_source("config_loader"),
        );
        let msg = err.to_string();
        assert!(msg.contains("base_url is not a valid URL"));
        assert!(msg.contains("field: config.base_url"));
        assert!(msg.contains("source: config_loader"));
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("config.base_url")
        );
    }

    #[test]
    fn test_tool_error_classification() {
        assert!(Error::UnknownFunction {
            name: "nope".into()
        }
        .is_tool_error());
        assert!(Error::malformed("f", "bad").is_tool_error());
        assert!(!Error::EmptyResponse.is_tool_error());
    }

    #[test]
    fn test_unresolved_ids_listed() {
        let err = Error::UnresolvedToolCall {
            ids: vec!["call_1".into(), "call_2".into()],
        };
        assert_eq!(err.to_string(), "Unresolved tool call(s): call_1, call_2");
    }
}
