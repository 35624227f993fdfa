//! HTTP transport and credential loading for the agent endpoint.
//!
//! The transport knows nothing about event semantics: it posts a JSON body and hands
//! back either a raw byte stream (streaming calls) or a decoded JSON document.

pub mod credentials;
pub mod http;

pub use credentials::read_token;
pub use http::{HttpTransport, TransportError};
