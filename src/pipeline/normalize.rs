//! Raw event normalization (kind + JSON payload -> NormalizedEvent)
//!
//! Every payload shape known from the three upstream schema revisions is
//! translated here, so the reducer never looks at literal event names or probes
//! for alternative field spellings.

use crate::types::{AgentEventKind, NormalizedEvent};
use crate::utils::PathMapper;
use serde_json::Value;

/// Collect the text of typed content parts.
///
/// Accepts a bare string, a single `{type: "text", text}` part, or a list of parts
/// (non-text parts are skipped).
fn text_parts(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().flat_map(text_parts_of_part).collect(),
        Value::Object(_) => text_parts_of_part(value),
        _ => Vec::new(),
    }
}

fn text_parts_of_part(part: &Value) -> Vec<&str> {
    if PathMapper::get_str(part, "type") == Some("text") {
        PathMapper::get_str(part, "text").into_iter().collect()
    } else {
        Vec::new()
    }
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(str::to_string)
}

/// Text carried by a legacy `delta` payload: a string, `{content: ...}` parts, or `{text}`.
fn delta_text(payload: &Value) -> Option<String> {
    let delta = payload.get("delta")?;
    if let Some(s) = delta.as_str() {
        return non_empty(Some(s));
    }
    if let Some(content) = delta.get("content") {
        let joined = text_parts(content).concat();
        return non_empty(Some(&joined));
    }
    non_empty(PathMapper::get_str(delta, "text"))
}

/// Translate one decoded event.
///
/// Returns `None` when the event carries nothing the reducer can use (for example
/// a text delta with an empty string).
pub fn normalize(kind: &AgentEventKind, payload: Value) -> Option<NormalizedEvent> {
    match kind {
        AgentEventKind::Status | AgentEventKind::ToolResultStatus => {
            match non_empty(PathMapper::first_str(&payload, &["message", "status_message"])) {
                Some(message) => Some(NormalizedEvent::Status { message, payload }),
                // Some revisions send bare status codes; keep probing the payload anyway.
                None => Some(NormalizedEvent::ToolActivity { payload }),
            }
        }
        AgentEventKind::ThinkingDelta => {
            let text = non_empty(PathMapper::first_str(
                &payload,
                &["text", "delta.text", "delta.thinking", "thinking"],
            ))
            .or_else(|| non_empty(PathMapper::get_str(&payload, "delta")))?;
            Some(NormalizedEvent::Reasoning {
                text,
                cumulative: false,
            })
        }
        AgentEventKind::Thinking => {
            let text = non_empty(PathMapper::first_str(
                &payload,
                &["text", "thinking", "thinking.text"],
            ))?;
            Some(NormalizedEvent::Reasoning {
                text,
                cumulative: true,
            })
        }
        AgentEventKind::ToolUse | AgentEventKind::ToolResult | AgentEventKind::AnalystDelta => {
            Some(NormalizedEvent::ToolActivity { payload })
        }
        AgentEventKind::TextDelta => {
            let text = non_empty(PathMapper::first_str(&payload, &["text", "delta.text"]))?;
            Some(NormalizedEvent::AnswerDelta {
                text,
                cumulative: false,
            })
        }
        AgentEventKind::Text => {
            let text = non_empty(PathMapper::get_str(&payload, "text"))?;
            Some(NormalizedEvent::AnswerDelta {
                text,
                cumulative: true,
            })
        }
        AgentEventKind::MessageDelta => {
            let text = delta_text(&payload)?;
            Some(NormalizedEvent::AnswerDelta {
                text,
                cumulative: false,
            })
        }
        AgentEventKind::Response => {
            let content = payload
                .get("content")
                .or_else(|| PathMapper::get_path(&payload, "message.content"))?;
            let parts: Vec<&str> = text_parts(content)
                .into_iter()
                .filter(|t| !t.is_empty())
                .collect();
            let text = non_empty(Some(&parts.join("\n")))?;
            Some(NormalizedEvent::FinalMessage { text })
        }
        AgentEventKind::Error => {
            let message = PathMapper::first_str(&payload, &["message", "error.message", "code"])
                .unwrap_or("unknown agent error")
                .to_string();
            Some(NormalizedEvent::AgentError { message })
        }
        AgentEventKind::Other(name) => {
            if let Some(text) = delta_text(&payload) {
                return Some(NormalizedEvent::AnswerDelta {
                    text,
                    cumulative: false,
                });
            }
            Some(NormalizedEvent::Unknown {
                kind: name.clone(),
                payload,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn norm(kind: &str, payload: Value) -> Option<NormalizedEvent> {
        normalize(&AgentEventKind::parse(kind), payload)
    }

    #[test]
    fn status_shapes() {
        let ev = norm("response.status", json!({"status": "planning", "message": "Planning"}));
        assert!(matches!(ev, Some(NormalizedEvent::Status { ref message, .. }) if message == "Planning"));

        let ev = norm("response.tool_result.status", json!({"message": "Executing SQL"}));
        assert!(matches!(ev, Some(NormalizedEvent::Status { ref message, .. }) if message == "Executing SQL"));

        let ev = norm("status", json!({"status": "executing_tool", "sql": "SELECT 1"}));
        assert!(matches!(ev, Some(NormalizedEvent::ToolActivity { .. })));
    }

    #[test]
    fn reasoning_shapes() {
        assert_eq!(
            norm("response.thinking.delta", json!({"text": "Because"})),
            Some(NormalizedEvent::Reasoning { text: "Because".into(), cumulative: false })
        );
        assert_eq!(
            norm("response.reasoning.delta", json!({"delta": {"text": "..."}})),
            Some(NormalizedEvent::Reasoning { text: "...".into(), cumulative: false })
        );
        assert_eq!(
            norm("response.thinking", json!({"text": "Because..."})),
            Some(NormalizedEvent::Reasoning { text: "Because...".into(), cumulative: true })
        );
        assert_eq!(norm("response.thinking.delta", json!({"text": ""})), None);
    }

    #[test]
    fn answer_shapes() {
        assert_eq!(
            norm("response.text.delta", json!({"text": "He", "content_index": 0})),
            Some(NormalizedEvent::AnswerDelta { text: "He".into(), cumulative: false })
        );
        assert_eq!(
            norm("response.text", json!({"text": "Hello"})),
            Some(NormalizedEvent::AnswerDelta { text: "Hello".into(), cumulative: true })
        );
        assert_eq!(
            norm(
                "message.delta",
                json!({"delta": {"content": [{"type": "text", "text": "a"}, {"type": "chart"}, {"type": "text", "text": "b"}]}})
            ),
            Some(NormalizedEvent::AnswerDelta { text: "ab".into(), cumulative: false })
        );
    }

    #[test]
    fn final_response_joins_text_parts() {
        assert_eq!(
            norm(
                "response",
                json!({"role": "assistant", "content": [
                    {"type": "thinking", "thinking": {"text": "x"}},
                    {"type": "text", "text": "Line one"},
                    {"type": "text", "text": "Line two"}
                ]})
            ),
            Some(NormalizedEvent::FinalMessage { text: "Line one\nLine two".into() })
        );
        assert_eq!(norm("response", json!({"content": []})), None);
    }

    #[test]
    fn legacy_delta_fallback_for_unnamed_events() {
        assert_eq!(
            norm("message", json!({"delta": "chunk"})),
            Some(NormalizedEvent::AnswerDelta { text: "chunk".into(), cumulative: false })
        );
        assert_eq!(
            norm("message", json!({"delta": {"content": {"type": "text", "text": "part"}}})),
            Some(NormalizedEvent::AnswerDelta { text: "part".into(), cumulative: false })
        );
    }

    #[test]
    fn unknown_kinds_keep_their_payload() {
        let ev = norm("response.table", json!({"result_set": {"sql": "SELECT 1"}}));
        assert!(matches!(ev, Some(NormalizedEvent::Unknown { ref kind, .. }) if kind == "response.table"));
    }

    #[test]
    fn error_events() {
        assert_eq!(
            norm("error", json!({"code": "399504", "message": "quota exceeded"})),
            Some(NormalizedEvent::AgentError { message: "quota exceeded".into() })
        );
    }
}
