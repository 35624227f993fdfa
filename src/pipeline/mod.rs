//! Agent response pipeline: raw SSE bytes in, render-ready emissions out.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Raw Bytes → Decoder → Normalize → Reducer → Emissions
//!     │          │          │           │
//!   HTTP       SSE      schema rev    steps, reasoning,
//!            framing    1/2/3 →      answer; (mode, text)
//!                     NormalizedEvent
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`decode`] | SSE framing over a byte stream |
//! | [`normalize`] | event kind + JSON payload to [`NormalizedEvent`](crate::types::NormalizedEvent) |
//! | [`reducer`] | the per-call state machine |
//! | [`stream`] | [`AgentStream`], the caller-facing emission stream |
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use futures::{stream, StreamExt};
//! use loadstar_agent::pipeline::Pipeline;
//!
//! # tokio_test_block(async {
//! let body = "event: response.text.delta\ndata: {\"text\":\"42\"}\n\n";
//! let bytes = Box::pin(stream::iter(vec![Ok::<_, loadstar_agent::Error>(Bytes::from(body))]));
//! let emissions: Vec<_> = Pipeline::default().process_stream(bytes).collect().await;
//! assert_eq!(emissions[0].as_tuple(), ("answer", "42"));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

pub mod decode;
pub mod normalize;
pub mod reducer;
pub mod stream;

pub use decode::{SseDecoder, SseFrame};
pub use reducer::{Phase, ReasoningAttribution, Reducer, ReducerOptions, ReducerState};
pub use stream::AgentStream;

use crate::BoxStream;

/// Wires the stages together for one agent call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    options: ReducerOptions,
}

impl Pipeline {
    pub fn new(options: ReducerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ReducerOptions {
        self.options
    }

    /// Decode and reduce a byte stream. A fresh reducer is created per call.
    pub fn process_stream(&self, input: BoxStream<'static, bytes::Bytes>) -> AgentStream {
        AgentStream::new(SseDecoder::decode_stream(input), self.options)
    }
}
