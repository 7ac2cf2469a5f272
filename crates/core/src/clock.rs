//! Time sources and the simulated environment clock.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A source of log timestamps.
pub trait TimeSource: Send + Sync {
    /// Returns the current time, in seconds since the Unix epoch.
    fn now(&self) -> f64;
}

/// A [`TimeSource`] reading the system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    #[inline]
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// The clock of a simulated environment the agent acts in.
///
/// The agent pauses it while waiting for the model, so that the simulation
/// doesn't advance during generation, and resumes it with the offset chosen
/// by the [`SimulatedGenerationTime`] policy.
pub trait EnvironmentClock: Send + Sync {
    /// Stops the simulated time.
    fn pause(&self);

    /// Restarts the simulated time after advancing it by `offset`.
    fn resume(&self, offset: Duration);
}

/// How much simulated time a model call takes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SimulatedGenerationTime {
    /// The measured wall-clock latency of the call.
    Measured,
    /// A fixed duration, regardless of the actual latency.
    Fixed {
        /// The duration in seconds.
        seconds: f64,
    },
}

impl SimulatedGenerationTime {
    /// Returns the offset to resume the environment clock with.
    pub fn offset(&self, measured: Duration) -> Duration {
        match self {
            SimulatedGenerationTime::Measured => measured,
            SimulatedGenerationTime::Fixed { seconds } => {
                Duration::try_from_secs_f64(*seconds).unwrap_or_default()
            }
        }
    }
}
