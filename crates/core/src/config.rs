use std::time::Duration;

use reagent_model::ToolChoice;
use serde::{Deserialize, Serialize};

use crate::clock::SimulatedGenerationTime;
use crate::dialect::OutputDialect;
use crate::template::MessageTemplates;

/// Configuration of an [`crate::Agent`].
///
/// Every field has a default, so a config can be deserialized from a
/// partial document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Identifies the agent in its log entries.
    pub agent_id: String,
    /// The wire format of the model output.
    pub dialect: OutputDialect,
    /// The system prompt, logged once before the first task.
    pub system_prompt: String,
    /// The maximum number of steps of a run.
    pub max_iterations: usize,
    /// How many times an empty model output is retried before giving up.
    pub invalid_format_retries: usize,
    /// Whether an observation that overflowed the context is replaced by a
    /// truncated view in the history.
    pub handle_prompt_too_long: bool,
    /// Whether the provider keeps prior turns server-side. Only the turns
    /// since the last tool call are sent, along with the previous
    /// response id.
    pub use_api_state: bool,
    /// Sequences that stop generation.
    pub stop_sequences: Vec<String>,
    /// Whether the model must call a tool.
    pub tool_choice: ToolChoice,
    /// How much simulated time a model call takes. Requires an
    /// [`crate::EnvironmentClock`].
    pub simulated_generation_time: Option<SimulatedGenerationTime>,
    /// Templates of the prompt messages.
    pub templates: MessageTemplates,
    /// Backoff of rate limited model calls.
    pub retry: RetryConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: "agent".to_owned(),
            dialect: OutputDialect::default(),
            system_prompt: String::new(),
            max_iterations: 80,
            invalid_format_retries: 10,
            handle_prompt_too_long: true,
            use_api_state: false,
            stop_sequences: vec![
                "<end_action>".to_owned(),
                "Observation:".to_owned(),
            ],
            tool_choice: ToolChoice::default(),
            simulated_generation_time: None,
            templates: MessageTemplates::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Exponential backoff applied when the engine reports a rate limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// The first delay, in milliseconds.
    pub initial_interval_ms: u64,
    /// The upper bound of a single delay, in milliseconds.
    pub max_interval_ms: u64,
    /// How long to keep retrying before the error is surfaced, in
    /// milliseconds.
    pub max_elapsed_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 500,
            max_interval_ms: 30_000,
            max_elapsed_ms: 120_000,
        }
    }
}

impl RetryConfig {
    #[inline]
    pub(crate) fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    #[inline]
    pub(crate) fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    #[inline]
    pub(crate) fn max_elapsed(&self) -> Duration {
        Duration::from_millis(self.max_elapsed_ms)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_partial_config() {
        let config: AgentConfig = serde_json::from_value(json!({
            "agent_id": "planner",
            "dialect": "responses",
            "use_api_state": true,
            "simulated_generation_time": { "mode": "measured" },
            "templates": { "task": "{content}" },
            "retry": { "max_elapsed_ms": 0 },
        }))
        .unwrap();

        assert_eq!(config.agent_id, "planner");
        assert_eq!(config.dialect, OutputDialect::Responses);
        assert_eq!(config.max_iterations, 80);
        assert_eq!(config.invalid_format_retries, 10);
        assert!(config.handle_prompt_too_long);
        assert_eq!(config.stop_sequences, ["<end_action>", "Observation:"]);
        assert_eq!(config.tool_choice, ToolChoice::Required);
        assert_eq!(
            config.simulated_generation_time,
            Some(SimulatedGenerationTime::Measured)
        );
        assert_eq!(config.templates.task, "{content}");
        assert_eq!(
            config.templates.observation,
            MessageTemplates::default().observation
        );
        assert_eq!(config.retry.max_elapsed(), Duration::ZERO);
        assert_eq!(config.retry.initial_interval_ms, 500);
    }
}
