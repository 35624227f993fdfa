//! Status-message classification.

use crate::types::StepCategory;

/// Cues that the agent is still deciding what to do.
pub const PLANNING_CUES: &[&str] = &[
    "planning",
    "choosing",
    "rethinking",
    "reviewing",
    "next steps",
    "data sources",
];

/// Cues that a tool is running.
pub const TOOL_CUES: &[&str] = &[
    "running",
    "streaming",
    "getting",
    "executing",
    "context",
    "sql",
];

/// Map a status message to [`StepCategory::Planning`] or [`StepCategory::ToolExecution`].
///
/// Planning cues are checked first; messages matching neither set count as planning.
pub fn categorize(message: &str) -> StepCategory {
    let lower = message.to_lowercase();
    if PLANNING_CUES.iter().any(|kw| lower.contains(kw)) {
        StepCategory::Planning
    } else if TOOL_CUES.iter().any(|kw| lower.contains(kw)) {
        StepCategory::ToolExecution
    } else {
        StepCategory::Planning
    }
}
