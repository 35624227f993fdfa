//! SQL handling for tool payloads: detection, nested-payload search and markup highlighting.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`detect`] | keyword-prefix check deciding whether a string "looks like SQL" |
//! | [`search`] | depth-capped search of JSON payloads for SQL and tool descriptions |
//! | [`highlight`] | SQL → HTML fragment with syntax coloring |

pub mod detect;
pub mod highlight;
pub mod search;

pub use detect::{is_sql, is_sql_value};
pub use highlight::highlight;
pub use search::{find_description, find_sql, MAX_SEARCH_DEPTH};
