//! Bearer-token loading.
//!
//! The container runtime mounts a short-lived OAuth token as a plain file; it is
//! re-read on every call because it rotates underneath long-running sessions.

use crate::{Error, ErrorContext, Result};
use std::io::ErrorKind;
use std::path::Path;

/// Read the bearer token at `path`, trimming surrounding whitespace.
///
/// A missing or empty file is a configuration problem, not an I/O failure.
pub async fn read_token(path: &Path) -> Result<String> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::configuration_with_context(
                "session token not found",
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("credentials"),
            ))
        }
        Err(e) => return Err(Error::Io(e)),
    };

    let token = raw.trim();
    if token.is_empty() {
        return Err(Error::configuration_with_context(
            "session token is empty",
            ErrorContext::new()
                .with_details(path.display().to_string())
                .with_source("credentials"),
        ));
    }
    Ok(token.to_string())
}
