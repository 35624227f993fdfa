//! Agent client: the streaming call and its non-streaming fallback.
//!
//! Neither entry point returns an error. Configuration, credential and transport
//! failures all turn into a single answer string.

pub mod agent;
pub mod response;

pub use agent::AgentClient;
pub use response::extract_answer_text;
