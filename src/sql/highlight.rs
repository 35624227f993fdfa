//! SQL → HTML syntax highlighting.
//!
//! Highlighting runs in two passes. The escaped text is first cut into protected
//! segments (block comments, line comments, single-quoted literals) and code
//! segments. Only code segments go through the keyword/function/number pass, so
//! nothing inside a literal or comment is ever recolored. Protected segments are
//! emitted verbatim inside their own style span.

use crate::utils::escape_html;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const KEYWORD_COLOR: &str = "#c678dd";
pub const BUILTIN_COLOR: &str = "#61afef";
pub const FUNCTION_COLOR: &str = "#56b6c2";
pub const NUMBER_COLOR: &str = "#d19a66";
pub const STRING_COLOR: &str = "#98c379";
pub const COMMENT_COLOR: &str = "#7f848e";

/// Reserved words colored as keywords (whole-word, case-insensitive).
pub const SQL_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "IN", "IS", "NULL", "AS", "ON", "JOIN",
    "LEFT", "RIGHT", "INNER", "OUTER", "FULL", "CROSS", "GROUP", "BY", "ORDER", "HAVING",
    "LIMIT", "OFFSET", "UNION", "ALL", "DISTINCT", "CASE", "WHEN", "THEN", "ELSE", "END",
    "WITH", "INSERT", "INTO", "VALUES", "UPDATE", "SET", "DELETE", "CREATE", "ALTER", "DROP",
    "TABLE", "VIEW", "ASC", "DESC", "BETWEEN", "LIKE", "ILIKE", "EXISTS", "QUALIFY", "OVER",
    "PARTITION", "MERGE", "USING", "TRUE", "FALSE",
];

/// Built-in functions, colored only when directly followed by `(`.
pub const SQL_BUILTINS: &[&str] = &[
    "COUNT", "SUM", "AVG", "MIN", "MAX", "COALESCE", "NULLIF", "CAST", "ROUND", "FLOOR", "CEIL",
    "ABS", "UPPER", "LOWER", "TRIM", "LENGTH", "SUBSTR", "SUBSTRING", "CONCAT", "DATE_TRUNC",
    "DATEADD", "DATEDIFF", "TO_DATE", "TO_CHAR", "TO_NUMBER", "CURRENT_DATE",
    "CURRENT_TIMESTAMP", "IFF", "IFNULL", "ROW_NUMBER", "RANK", "DENSE_RANK", "LAG", "LEAD",
    "LISTAGG",
];

/// Comments and string literals. Unterminated ones run to the end of the input.
static PROTECTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/\*[\s\S]*?(?:\*/|\z)|--[^\n]*|'(?:[^']|'')*(?:'|\z)")
        .expect("protected-segment pattern is valid")
});

/// One alternation so a token is colored at most once: builtins, keywords, other
/// function calls, then numbers.
static TOKENS: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)\b(?P<builtin>{})\(|\b(?P<kw>{})\b|\b(?P<func>[a-z_][a-z0-9_]*)\(|\b(?P<num>\d+(?:\.\d+)?)\b",
        SQL_BUILTINS.join("|"),
        SQL_KEYWORDS.join("|"),
    );
    Regex::new(&pattern).expect("token pattern is valid")
});

fn span(class: &str, color: &str, text: &str) -> String {
    format!(
        r#"<span class="{}" style="color:{};">{}</span>"#,
        class, color, text
    )
}

fn color_code(code: &str) -> String {
    TOKENS
        .replace_all(code, |caps: &Captures| {
            if let Some(m) = caps.name("builtin") {
                format!("{}(", span("sql-builtin", BUILTIN_COLOR, m.as_str()))
            } else if let Some(m) = caps.name("kw") {
                span("sql-keyword", KEYWORD_COLOR, m.as_str())
            } else if let Some(m) = caps.name("func") {
                format!("{}(", span("sql-function", FUNCTION_COLOR, m.as_str()))
            } else if let Some(m) = caps.name("num") {
                span("sql-number", NUMBER_COLOR, m.as_str())
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Render `sql` as an HTML fragment with syntax coloring.
///
/// The input is escaped before anything else, so the result is safe to embed.
pub fn highlight(sql: &str) -> String {
    let escaped = escape_html(sql);
    let mut out = String::with_capacity(escaped.len() * 2);
    let mut last = 0;

    for m in PROTECTED.find_iter(&escaped) {
        out.push_str(&color_code(&escaped[last..m.start()]));
        let text = m.as_str();
        if text.starts_with('\'') {
            out.push_str(&span("sql-string", STRING_COLOR, text));
        } else {
            out.push_str(&span("sql-comment", COMMENT_COLOR, text));
        }
        last = m.end();
    }
    out.push_str(&color_code(&escaped[last..]));
    out
}
