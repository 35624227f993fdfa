//! # loadstar-agent
//!
//! Streaming client for the LoadStar broker-intelligence agent.
//!
//! The agent answers natural-language questions about freight brokers over a
//! server-sent-event stream whose event shapes changed across three schema
//! revisions. This crate turns that stream into an ordered sequence of
//! `(mode, text)` emissions (`status`, `thinking`, `sql`, `answer`) and a final
//! [`Transcript`] of timeline steps, reasoning and answer text.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use loadstar_agent::AgentClient;
//!
//! #[tokio::main]
//! async fn main() -> loadstar_agent::Result<()> {
//!     let client = AgentClient::from_env()?;
//!     let mut stream = client.ask_stream("Which brokers are high risk?", Some("Acme Freight")).await;
//!     while let Some(emission) = stream.next().await {
//!         println!("{}: {}", emission.mode, emission.text);
//!     }
//!     let transcript = stream.into_transcript();
//!     println!("{} steps", transcript.steps.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | streaming call and non-streaming fallback |
//! | [`pipeline`] | SSE decoding, event normalization, the stream reducer |
//! | [`sql`] | SQL detection, nested-payload search, highlighting |
//! | [`classify`] | status message categories |
//! | [`render`] | timeline markup |
//! | [`session`] | chat history |
//! | [`warehouse`] | query runner and its TTL cache |
//! | [`config`] | endpoint configuration |
//! | [`types`] | events, steps, messages |

pub mod classify;
pub mod client;
pub mod config;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod sql;
pub mod transport;
pub mod types;
pub mod utils;
pub mod warehouse;

// Re-export main types for convenience
pub use client::AgentClient;
pub use config::AgentConfig;
pub use pipeline::{AgentStream, Pipeline, ReasoningAttribution, Reducer, ReducerOptions};
pub use session::ChatSession;
pub use types::{
    EmitMode, Emission, NormalizedEvent, Outcome, Step, StepCategory, Transcript,
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A specialized Result for pipeline operations
pub type PipeResult<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `PipeResult<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = PipeResult<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
