use std::sync::Arc;

use reagent_model::{
    EngineRequest, LlmOutputLog, LogKind, LogType, ParsedAction,
};
use serde_json::Value;
use tokio::time::Instant;
use tracing::Instrument;

use super::{Agent, StepOutcome};
use crate::error::Error;
use crate::history::{HistoryOptions, build_history};
use crate::tool::ExecutionOutcome;

const STATELESS_EXCLUDED: &[LogType] = &[LogType::Thought, LogType::LlmOutput];
const STATEFUL_EXCLUDED: &[LogType] =
    &[LogType::Thought, LogType::LlmOutput, LogType::Rationale];

impl Agent {
    /// Runs one turn: asks the model for an action and executes it.
    pub async fn step(&mut self) -> Result<StepOutcome, Error> {
        let span = debug_span!("step", agent_id = %self.config.agent_id);
        self.step_inner().instrument(span).await
    }

    async fn step_inner(&mut self) -> Result<StepOutcome, Error> {
        let request = self.build_request();
        self.append(LogKind::LlmInput(request.messages.clone()));

        let started = Instant::now();
        let clock = self.clock.clone();
        let resp = match (clock, self.config.simulated_generation_time) {
            (Some(clock), Some(policy)) => {
                clock.pause();
                let resp = self.call_model(&request).await;
                let offset = policy.offset(started.elapsed());
                debug!("resuming the environment clock with {offset:?}");
                clock.resume(offset);
                resp?
            }
            _ => self.call_model(&request).await?,
        };
        let completion_duration = started.elapsed().as_secs_f64();
        if self.config.use_api_state {
            self.previous_response_id = resp.id.clone();
        }

        let action = match self.config.dialect.parse(resp.output.as_ref()) {
            Ok(action) => ParsedAction::from(action),
            Err(err) => {
                error!("failed to parse the model output: {err}");
                return Err(err.into());
            }
        };

        let trace = thought_action_trace(&action);
        debug!("{trace}");
        self.append(LogKind::LlmOutputThoughtAction(LlmOutputLog {
            content: trace,
            usage: resp.usage,
            completion_duration,
        }));
        if let Some(rationale) = &action.rationale {
            self.append(LogKind::Thought(rationale.clone()));
        }

        let outcome = self
            .tool_executor
            .execute_parsed_action(
                &action,
                &mut self.log,
                Arc::as_ref(&self.time_source),
                &self.config.agent_id,
            )
            .await?;
        match outcome {
            ExecutionOutcome::Continue => Ok(StepOutcome::Continue),
            ExecutionOutcome::FinalAnswer(answer) => {
                if let Some(on_final_answer) = &self.on_final_answer {
                    on_final_answer(&answer);
                }
                Ok(StepOutcome::FinalAnswer(answer))
            }
        }
    }

    fn build_request(&self) -> EngineRequest {
        let stateful = self.config.use_api_state;
        let excluded = if stateful {
            STATEFUL_EXCLUDED
        } else {
            STATELESS_EXCLUDED
        };
        let options = HistoryOptions {
            templates: &self.config.templates,
            handle_prompt_too_long: self.config.handle_prompt_too_long,
        };
        let messages =
            build_history(self.log.entries(), excluded, stateful, &options);

        EngineRequest {
            messages,
            tools: self.tool_executor.tools().definitions(),
            stop_sequences: self.config.stop_sequences.clone(),
            tool_choice: self.config.tool_choice,
            previous_response_id: if stateful {
                self.previous_response_id.clone()
            } else {
                None
            },
        }
    }
}

fn thought_action_trace(action: &ParsedAction) -> String {
    format!(
        "Thought: {}\nAction:\n{{\n  \"action\": {},\n  \"action_input\": {}\n}}",
        action.rationale.as_deref().unwrap_or_default(),
        Value::String(action.tool_name.clone()),
        action.arguments.to_value(),
    )
}
