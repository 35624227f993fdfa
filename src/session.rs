//! Chat history for one user session.
//!
//! Assistant turns keep their structured steps rather than pre-rendered markup, so
//! history can be re-rendered after styling changes.

use crate::render::render_steps;
use crate::types::{ConversationTurn, MessageRole, Transcript};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    turns: Vec<ConversationTurn>,
    /// Broker the conversation is scoped to, if any.
    context: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: impl Into<String>) -> Self {
        let context = context.into();
        Self {
            turns: Vec::new(),
            context: (!context.trim().is_empty()).then_some(context),
        }
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn push_user(&mut self, question: impl Into<String>) {
        self.turns.push(ConversationTurn::user(question));
    }

    pub fn record_assistant(&mut self, transcript: Transcript) -> &ConversationTurn {
        debug!(
            steps = transcript.steps.len(),
            outcome = ?transcript.outcome,
            "recording assistant turn"
        );
        self.turns.push(ConversationTurn::assistant(transcript));
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Timeline markup for an assistant turn.
    ///
    /// `None` for user turns, out-of-range indices, and assistant turns that
    /// recorded neither steps nor reasoning.
    pub fn render_turn(&self, idx: usize) -> Option<String> {
        let turn = self.turns.get(idx)?;
        if turn.role != MessageRole::Assistant
            || (turn.steps.is_empty() && turn.reasoning.is_none())
        {
            return None;
        }
        Some(render_steps(&turn.steps, turn.reasoning.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Outcome, Step, StepCategory};

    fn transcript() -> Transcript {
        Transcript {
            steps: vec![
                Step::new(StepCategory::Planning, "Planning approach"),
                Step::new(StepCategory::SqlQuery, "SELECT 1"),
            ],
            reasoning: None,
            answer: "The answer is 42.".to_string(),
            outcome: Outcome::Completed,
        }
    }

    #[test]
    fn turns_alternate_and_keep_steps() {
        let mut session = ChatSession::with_context("Acme Freight");
        session.push_user("How many loads?");
        let turn = session.record_assistant(transcript());
        assert_eq!(turn.content, "The answer is 42.");
        assert_eq!(turn.steps.len(), 2);

        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.context(), Some("Acme Freight"));
    }

    #[test]
    fn only_assistant_turns_with_steps_render() {
        let mut session = ChatSession::new();
        session.push_user("q");
        session.record_assistant(transcript());
        session.record_assistant(Transcript {
            steps: Vec::new(),
            reasoning: None,
            answer: "No response from agent.".to_string(),
            outcome: Outcome::Completed,
        });

        assert_eq!(session.render_turn(0), None);
        assert!(session.render_turn(1).unwrap().contains("Planning approach"));
        assert_eq!(session.render_turn(2), None);
        assert_eq!(session.render_turn(9), None);
    }

    #[test]
    fn blank_context_is_ignored() {
        assert_eq!(ChatSession::with_context("  ").context(), None);
    }
}
