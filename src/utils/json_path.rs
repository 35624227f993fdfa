//! Dotted-path lookup into loosely-typed event payloads.
//!
//! Supports:
//! - Nested path access (e.g., "delta.content")
//! - Array indexing (e.g., "content[0].text" or "content.0.text")

use serde_json::Value;

/// Path mapper for extracting values from JSON using dot-notation paths
pub struct PathMapper;

impl PathMapper {
    /// Get value from JSON using dot-notation path (supports array indexing)
    ///
    /// Examples:
    /// - "delta.text"
    /// - "message.content[0].text"
    /// - "$.tool_result.sql"
    pub fn get_path<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
        if path.is_empty() {
            return None;
        }

        // Remove leading "$." if present (JSONPath style)
        let normalized = path.trim().trim_start_matches("$.");
        let mut current = obj;

        for part in normalized.split('.') {
            if part.is_empty() {
                return None;
            }

            // "content[0]": key access followed by an index
            if let Some(bracket_pos) = part.find('[') {
                let key = &part[..bracket_pos];
                let idx_str = part[bracket_pos + 1..].trim_end_matches(']');

                if !key.is_empty() {
                    current = current.as_object()?.get(key)?;
                }
                let idx = idx_str.parse::<usize>().ok()?;
                current = current.as_array()?.get(idx)?;
                continue;
            }

            current = match current {
                Value::Object(map) => map.get(part)?,
                // Support "0" / "1" style index segments
                Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// String value at `path`; non-string values are not coerced.
    pub fn get_str<'a>(obj: &'a Value, path: &str) -> Option<&'a str> {
        Self::get_path(obj, path).and_then(Value::as_str)
    }

    /// First string found among `paths`, in order.
    pub fn first_str<'a>(obj: &'a Value, paths: &[&str]) -> Option<&'a str> {
        paths.iter().find_map(|p| Self::get_str(obj, p))
    }
}
