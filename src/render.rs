//! Timeline markup for the "agent reasoning" panel.
//!
//! Pure string building, no I/O. Every piece of agent-supplied text is escaped;
//! SQL goes through [`highlight`](crate::sql::highlight), which escapes on its own.

use crate::sql::highlight;
use crate::types::{Step, StepCategory};
use crate::utils::{escape_html, truncate_chars};
use std::fmt::Write;

pub const PLANNING_ICON: &str = "✓";
pub const PLANNING_COLOR: &str = "#1a6ce7";
pub const TOOL_ICON: &str = "⚡";
pub const TOOL_COLOR: &str = "#e8a317";
pub const SQL_COLOR: &str = "#9c5bea";
pub const REASONING_COLOR: &str = "#1db588";

/// Character budget for reasoning attached to a single step.
pub const STEP_REASONING_LIMIT: usize = 1500;
/// Character budget for the whole-response reasoning block.
pub const RESPONSE_REASONING_LIMIT: usize = 800;

/// Shown while no step has arrived yet.
pub const PROCESSING_PLACEHOLDER: &str =
    r#"<div class="thinking-section"><em>⏳ Processing...</em></div>"#;

fn render_marker_step(out: &mut String, icon: &str, color: &str, step: &Step) {
    write!(
        out,
        r#"<div class="step-item" style="border-left: 3px solid {color}; padding-left: 12px; margin-bottom: 8px;"><span class="icon">{icon}</span> {text}</div>"#,
        color = color,
        icon = icon,
        text = escape_html(&step.text),
    )
    .ok();
    if !step.reasoning.is_empty() {
        write!(
            out,
            r#"<div class="reasoning-text step-reasoning" style="margin-left: 24px; margin-bottom: 8px;">{}</div>"#,
            escape_html(&truncate_chars(&step.reasoning, STEP_REASONING_LIMIT)),
        )
        .ok();
    }
}

fn render_sql_step(out: &mut String, step: &Step) {
    write!(
        out,
        concat!(
            r#"<details class="step-item sql-step" style="border-left: 3px solid {color}; padding-left: 12px; margin-bottom: 12px;">"#,
            r#"<summary><span class="sql-chip" style="color: {color}; font-weight: 600;">SQL</span> Query</summary>"#,
            r#"<pre class="sql-block"><code>{code}</code></pre>"#,
            r#"</details>"#,
        ),
        color = SQL_COLOR,
        code = highlight(&step.text),
    )
    .ok();
}

/// Render `steps` in order, followed by the optional whole-response `reasoning`.
///
/// With no steps and no reasoning the result is [`PROCESSING_PLACEHOLDER`].
pub fn render_steps(steps: &[Step], reasoning: Option<&str>) -> String {
    let mut out = String::new();
    for step in steps {
        match step.category {
            StepCategory::Planning => render_marker_step(&mut out, PLANNING_ICON, PLANNING_COLOR, step),
            StepCategory::ToolExecution => render_marker_step(&mut out, TOOL_ICON, TOOL_COLOR, step),
            StepCategory::SqlQuery => render_sql_step(&mut out, step),
        }
    }

    if let Some(text) = reasoning.filter(|r| !r.is_empty()) {
        write!(
            out,
            r#"<div class="thinking-section reasoning" style="border-left-color: {}"><div class="section-label">🧠 Agent Reasoning</div><div class="reasoning-text">{}</div></div>"#,
            REASONING_COLOR,
            escape_html(&truncate_chars(text, RESPONSE_REASONING_LIMIT)),
        )
        .ok();
    }

    if out.is_empty() {
        return PROCESSING_PLACEHOLDER.to_string();
    }
    out
}
