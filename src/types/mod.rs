//! Core data types: upstream events, timeline steps and conversation messages.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`events`] | raw event kinds, [`NormalizedEvent`], [`Emission`] |
//! | [`step`] | [`Step`], [`StepCategory`], [`Transcript`] |
//! | [`message`] | request bodies and [`ConversationTurn`] |

pub mod events;
pub mod message;
pub mod step;

pub use events::{AgentEventKind, EmitMode, Emission, NormalizedEvent};
pub use message::{AgentRequest, ConversationTurn, Message, MessageRole};
pub use step::{Outcome, Step, StepCategory, Transcript};
