//! The canonical data model of the agent loop.
//!
//! This crate establishes the shapes that every part of the loop agrees on:
//! the dialect-independent action parsed from a model output, the
//! append-only agent log, the prompt messages rebuilt from that log, and the
//! protocol an LLM engine implements.
//!
//! Types in this crate don't define any behavior beyond trivial
//! conversions, instead they are the constraints that the parsers, the
//! executor and the engines should adhere to.

#![deny(missing_docs)]

mod action;
mod error;
mod log;
mod observation;
mod provider;
mod request;
mod response;

pub use action::*;
pub use error::*;
pub use log::*;
pub use observation::*;
pub use provider::*;
pub use request::*;
pub use response::*;
