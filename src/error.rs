use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.host", "payload.messages[0]")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the path that could not be read)
    pub details: Option<String>,
    /// Source of the error (e.g., "credentials", "agent_client")
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

/// Unified error type for the agent client.
///
/// Nothing in the public streaming surface returns this to callers; the client
/// folds it into an answer string (see [`Error::answer_text`]).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Runtime error: {message}{}", format_context(.context))]
    Runtime {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote error: HTTP {status}")]
    Remote { status: u16, body: Option<String> },
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

/// Answer shown when the agent cannot be reached because of missing configuration.
pub const UNAVAILABLE_PREFIX: &str = "Agent unavailable";
/// Answer shown when the transport times out.
pub const TIMEOUT_ANSWER: &str = "Agent request timed out. Please try again.";

impl Error {
    /// Create a new runtime error with structured context
    pub fn runtime_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Runtime {
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

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Runtime { context, .. } => Some(context),
            _ => None,
        }
    }

    /// True when the request or the event stream gave up waiting.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transport(TransportError::Http(e)) => e.is_timeout(),
            Error::Transport(TransportError::Timeout) => true,
            _ => false,
        }
    }

    /// Render the error as the single answer string shown to the user.
    pub fn answer_text(&self) -> String {
        match self {
            Error::Configuration { message, .. } => format!("{} — {}.", UNAVAILABLE_PREFIX, message),
            Error::Remote { status, .. } => format!("Agent returned HTTP {}", status),
            e if e.is_timeout() => TIMEOUT_ANSWER.to_string(),
            Error::Transport(e) => format!("Agent error: {}", e),
            other => format!("Agent error: {}", other),
        }
    }
}
