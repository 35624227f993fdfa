//! Request bodies for the agent endpoint and session-scoped conversation turns.

use super::step::{Step, Transcript};
use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Content block of a request message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Message as sent to the agent `:run` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }
}

/// Body of a `:run` request.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRequest {
    pub stream: bool,
    pub messages: Vec<Message>,
}

impl AgentRequest {
    /// Single-question request. A non-empty `context` names the broker the question is about.
    pub fn question(question: &str, context: Option<&str>, stream: bool) -> Self {
        Self {
            stream,
            messages: vec![Message::user(full_question(question, context))],
        }
    }
}

/// Prefix the question with its broker context, if any.
pub fn full_question(question: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(ctx) => format!("Regarding broker '{}': {}", ctx, question),
        None => question.to_string(),
    }
}

/// One completed chat interaction kept for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    /// Whole-response reasoning for assistant turns streamed without per-step attribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            steps: Vec::new(),
            reasoning: None,
        }
    }

    pub fn assistant(transcript: Transcript) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: transcript.answer,
            steps: transcript.steps,
            reasoning: transcript.reasoning,
        }
    }
}
