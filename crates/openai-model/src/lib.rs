//! The OpenAI wire dialects of the agent loop.
//!
//! Two API shapes are supported: the [`chat`] completions dialect, whose
//! assistant message is accumulated from streamed fragments, and the
//! [`responses`] dialect, whose output is a list of typed blocks. Each
//! dialect knows how to parse its raw output into a
//! [`reagent_model::CanonicalAction`], and how to render prompt messages
//! back into its request input.
//!
//! This crate does not perform any I/O.

#[macro_use]
extern crate tracing;

pub mod chat;
mod proto;
mod response;
pub mod responses;

pub use response::{ChatCompletionAccumulator, ReasoningFormat};
