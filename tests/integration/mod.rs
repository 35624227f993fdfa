//! Integration tests against a mock agent endpoint

pub mod mock_server;
pub mod fallback;
pub mod streaming;
