//! Depth-capped search of loosely-typed tool payloads.
//!
//! Tool calls and tool results nest their interesting fields at whatever depth the
//! upstream schema version chose. Both searches walk mappings and sequences,
//! never fail, and stop at [`MAX_SEARCH_DEPTH`] so a pathological payload can't
//! run away with the stack.

use super::detect::is_sql;
use serde_json::Value;

/// Nesting levels below the root that are still inspected.
pub const MAX_SEARCH_DEPTH: usize = 5;

/// Fields that hold SQL by name.
const SQL_FIELDS: &[&str] = &["sql", "generated_sql", "sql_query"];
/// Fields that hold either SQL or a natural-language description of the action.
const QUERY_FIELDS: &[&str] = &["query", "statement"];

/// First SQL string in `payload`.
///
/// Within a mapping, named SQL fields win over `query`/`statement` fields, which
/// win over a generic scan of every value.
pub fn find_sql(payload: &Value) -> Option<String> {
    find_sql_at(payload, 0)
}

fn find_sql_at(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }
    match value {
        Value::String(s) => is_sql(s).then(|| s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(|v| find_sql_at(v, depth + 1)),
        Value::Object(map) => {
            for field in SQL_FIELDS.iter().chain(QUERY_FIELDS) {
                if let Some(Value::String(s)) = map.get(*field) {
                    if is_sql(s) {
                        return Some(s.trim().to_string());
                    }
                }
            }
            map.values().find_map(|v| find_sql_at(v, depth + 1))
        }
        _ => None,
    }
}

/// First `query`/`statement` field whose value is prose rather than SQL.
pub fn find_description(payload: &Value) -> Option<String> {
    find_description_at(payload, 0)
}

fn find_description_at(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }
    match value {
        Value::Array(items) => items.iter().find_map(|v| find_description_at(v, depth + 1)),
        Value::Object(map) => {
            for field in QUERY_FIELDS {
                if let Some(Value::String(s)) = map.get(*field) {
                    let s = s.trim();
                    if !s.is_empty() && !is_sql(s) {
                        return Some(s.to_string());
                    }
                }
            }
            map.values()
                .filter(|v| v.is_object() || v.is_array())
                .find_map(|v| find_description_at(v, depth + 1))
        }
        _ => None,
    }
}
