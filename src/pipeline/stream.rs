//! The emission stream handed to callers.

use super::decode::SseFrame;
use super::reducer::{Reducer, ReducerOptions};
use crate::types::{Emission, Transcript};
use crate::{BoxStream, Error};
use futures::Stream;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Stream of `(mode, text)` emissions for one agent call.
///
/// Frames are pulled one at a time and fully reduced before the next is read.
/// The underlying connection is dropped as soon as the frame stream ends or fails,
/// and also when the caller drops this value early.
pub struct AgentStream {
    frames: Option<BoxStream<'static, SseFrame>>,
    reducer: Reducer,
    queue: VecDeque<Emission>,
}

impl AgentStream {
    pub fn new(frames: BoxStream<'static, SseFrame>, options: ReducerOptions) -> Self {
        let mut reducer = Reducer::new(options);
        reducer.start();
        Self {
            frames: Some(frames),
            reducer,
            queue: VecDeque::new(),
        }
    }

    /// A stream that yields the failure answer and ends, without touching the network.
    pub fn failed(err: Error, options: ReducerOptions) -> Self {
        let mut reducer = Reducer::new(options);
        let queue = reducer.fail(&err).into();
        Self {
            frames: None,
            reducer,
            queue,
        }
    }

    pub fn reducer(&self) -> &Reducer {
        &self.reducer
    }

    /// Timeline markup for what has been reduced so far.
    pub fn render(&self) -> String {
        self.reducer.render()
    }

    /// Finalized state. Any frames not yet consumed are discarded.
    pub fn into_transcript(self) -> Transcript {
        self.reducer.into_transcript()
    }
}

impl Stream for AgentStream {
    type Item = Emission;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(emission) = this.queue.pop_front() {
                return Poll::Ready(Some(emission));
            }
            let Some(frames) = this.frames.as_mut() else {
                return Poll::Ready(None);
            };

            match frames.as_mut().poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(frame))) => {
                    this.queue.extend(this.reducer.ingest(&frame));
                }
                Poll::Ready(Some(Err(err))) => {
                    this.frames = None;
                    this.queue.extend(this.reducer.fail(&err));
                }
                Poll::Ready(None) => {
                    this.frames = None;
                    this.queue.extend(this.reducer.finish());
                }
            }
        }
    }
}
