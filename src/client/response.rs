//! Answer extraction for non-streaming responses.

use crate::pipeline::reducer::NO_RESPONSE_ANSWER;
use crate::utils::PathMapper;
use serde_json::Value;

fn assistant_texts<'a>(message: &'a Value, out: &mut Vec<&'a str>) {
    if PathMapper::get_str(message, "role") != Some("assistant") {
        return;
    }
    match message.get("content") {
        Some(Value::String(s)) => out.push(s),
        Some(Value::Array(parts)) => {
            for part in parts {
                if PathMapper::get_str(part, "type") == Some("text") {
                    if let Some(text) = PathMapper::get_str(part, "text") {
                        out.push(text);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Pull assistant-authored text out of a `:run` JSON body.
///
/// Looks at the `messages` list, or the singular `message` when the list is absent
/// or empty. Content may be a plain string or a list of typed parts. Multiple parts
/// are joined with newlines. A bare top-level `text` field is the last resort.
pub fn extract_answer_text(body: &Value) -> Option<String> {
    let messages: Vec<&Value> = match body.get("messages").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => list.iter().collect(),
        _ => body.get("message").into_iter().collect(),
    };

    let mut parts = Vec::new();
    for message in messages {
        assistant_texts(message, &mut parts);
    }
    parts.retain(|p| !p.is_empty());
    if !parts.is_empty() {
        return Some(parts.join("\n"));
    }

    PathMapper::get_str(body, "text")
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// [`extract_answer_text`] with the no-response placeholder as fallback.
pub fn answer_or_placeholder(body: &Value) -> String {
    extract_answer_text(body).unwrap_or_else(|| NO_RESPONSE_ANSWER.to_string())
}
