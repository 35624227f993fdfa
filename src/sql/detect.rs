use serde_json::Value;

/// Statement keywords that mark a string as SQL when it starts with one of them.
pub const SQL_STATEMENT_KEYWORDS: &[&str] = &[
    "SELECT", "WITH", "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP", "MERGE", "CALL",
    "SHOW", "DESCRIBE", "EXPLAIN", "GRANT", "REVOKE",
];

/// Does `text` look like a SQL statement?
///
/// Leading whitespace is ignored and the check is case-insensitive. The keyword has to
/// end at a word boundary, so prose such as "Showing results" is not mistaken for `SHOW`.
pub fn is_sql(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    let upper = trimmed.to_uppercase();
    SQL_STATEMENT_KEYWORDS.iter().any(|kw| {
        upper.starts_with(kw)
            && upper[kw.len()..]
                .chars()
                .next()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_'))
    })
}

/// [`is_sql`] for loosely-typed payload values; anything but a string is not SQL.
pub fn is_sql_value(value: &Value) -> bool {
    value.as_str().map_or(false, is_sql)
}
