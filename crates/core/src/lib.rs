//! Core logic including the step loop, tool execution, history building,
//! configurations, etc.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod clock;
mod config;
mod dialect;
mod error;
pub mod history;
mod model_client;
mod template;
pub mod tool;

pub use agent::{Agent, AgentBuilder, RunOutcome, StepOutcome};
pub use clock::{
    EnvironmentClock, SimulatedGenerationTime, SystemTimeSource, TimeSource,
};
pub use config::{AgentConfig, RetryConfig};
pub use dialect::OutputDialect;
pub use error::Error;
pub use model_client::ModelClient;
pub use template::MessageTemplates;
