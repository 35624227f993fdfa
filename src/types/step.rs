//! Timeline steps and the finalized transcript of one agent call.

use serde::{Deserialize, Serialize};

/// What kind of timeline entry a [`Step`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepCategory {
    Planning,
    ToolExecution,
    SqlQuery,
}

/// One entry in the visible "agent reasoning" timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub category: StepCategory,
    pub text: String,
    /// Reasoning attributed to this step; always empty for SQL steps.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reasoning: String,
}

impl Step {
    pub fn new(category: StepCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
            reasoning: String::new(),
        }
    }

    pub fn is_sql(&self) -> bool {
        self.category == StepCategory::SqlQuery
    }
}

/// How the reducer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    Failed,
    TimedOut,
}

/// Finalized state of one streaming call, handed to the caller for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub steps: Vec<Step>,
    /// Whole-response reasoning; only set when reasoning is not attributed per step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub answer: String,
    pub outcome: Outcome,
}
