//! Upstream event kinds, their normalized form, and what the reducer emits.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Literal SSE event names seen across the agent's schema revisions.
///
/// Revision 1 streamed status, thinking deltas, tool results and text deltas.
/// Revision 2 added tool-use events and cumulative thinking/text snapshots.
/// Revision 3 added analyst-tool deltas and renamed reasoning deltas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEventKind {
    /// `response.status` (rev 1), `status` (rev 3)
    Status,
    /// `response.tool_result.status`
    ToolResultStatus,
    /// `response.thinking.delta` (rev 1), `response.reasoning.delta` (rev 3); incremental
    ThinkingDelta,
    /// `response.thinking`; cumulative snapshot
    Thinking,
    /// `response.tool_use`, `response.tool_call`
    ToolUse,
    /// `response.tool_result`
    ToolResult,
    /// `response.tool_result.analyst.delta`
    AnalystDelta,
    /// `response.text.delta`; incremental
    TextDelta,
    /// `response.text`; cumulative snapshot
    Text,
    /// `message.delta`; incremental content parts
    MessageDelta,
    /// `response`; the whole final message
    Response,
    /// `error`
    Error,
    /// Anything else, including the SSE default `message`.
    Other(String),
}

impl AgentEventKind {
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "response.status" | "status" => Self::Status,
            "response.tool_result.status" => Self::ToolResultStatus,
            "response.thinking.delta" | "response.reasoning.delta" => Self::ThinkingDelta,
            "response.thinking" => Self::Thinking,
            "response.tool_use" | "response.tool_call" => Self::ToolUse,
            "response.tool_result" => Self::ToolResult,
            "response.tool_result.analyst.delta" => Self::AnalystDelta,
            "response.text.delta" => Self::TextDelta,
            "response.text" => Self::Text,
            "message.delta" => Self::MessageDelta,
            "response" => Self::Response,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Schema-independent event the reducer dispatches on.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedEvent {
    /// Short human-readable progress message plus the payload it came with.
    Status { message: String, payload: Value },
    /// Reasoning text; `cumulative` snapshots repeat everything seen so far.
    Reasoning { text: String, cumulative: bool },
    /// Tool call or tool result; probed for a description and embedded SQL.
    ToolActivity { payload: Value },
    /// Answer text; `cumulative` snapshots replace, chunks append.
    AnswerDelta { text: String, cumulative: bool },
    /// Whole final message, used only when no answer text arrived before it.
    FinalMessage { text: String },
    /// Upstream-reported error. Informational; the stream continues.
    AgentError { message: String },
    /// Unrecognized kind, kept for the catch-all SQL scan.
    Unknown { kind: String, payload: Value },
}

/// Channel an [`Emission`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitMode {
    Status,
    Thinking,
    Sql,
    Answer,
}

impl EmitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmitMode::Status => "status",
            EmitMode::Thinking => "thinking",
            EmitMode::Sql => "sql",
            EmitMode::Answer => "answer",
        }
    }
}

impl std::fmt::Display for EmitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One render-ready update: the `(mode, text)` pair handed to the caller.
///
/// `thinking` and `answer` carry the cumulative text so far; `status` and `sql`
/// carry the single new item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emission {
    pub mode: EmitMode,
    pub text: String,
}

impl Emission {
    pub fn new(mode: EmitMode, text: impl Into<String>) -> Self {
        Self {
            mode,
            text: text.into(),
        }
    }

    pub fn status(text: impl Into<String>) -> Self {
        Self::new(EmitMode::Status, text)
    }

    pub fn thinking(text: impl Into<String>) -> Self {
        Self::new(EmitMode::Thinking, text)
    }

    pub fn sql(text: impl Into<String>) -> Self {
        Self::new(EmitMode::Sql, text)
    }

    pub fn answer(text: impl Into<String>) -> Self {
        Self::new(EmitMode::Answer, text)
    }

    pub fn as_tuple(&self) -> (&'static str, &str) {
        (self.mode.as_str(), self.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_across_revisions() {
        assert_eq!(AgentEventKind::parse("response.status"), AgentEventKind::Status);
        assert_eq!(AgentEventKind::parse("status"), AgentEventKind::Status);
        assert_eq!(
            AgentEventKind::parse("response.reasoning.delta"),
            AgentEventKind::ThinkingDelta
        );
        assert_eq!(
            AgentEventKind::parse("response.chart"),
            AgentEventKind::Other("response.chart".to_string())
        );
    }

    #[test]
    fn emission_tuple() {
        let e = Emission::sql("SELECT 1");
        assert_eq!(e.as_tuple(), ("sql", "SELECT 1"));
        assert_eq!(
            serde_json::to_string(&e).unwrap(),
            r#"{"mode":"sql","text":"SELECT 1"}"#
        );
    }
}
