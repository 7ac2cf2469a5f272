mod builder;
mod state;
mod step;

use std::sync::Arc;

use reagent_model::{
    AgentLog, Attachment, ErrorKind, ErrorLog, LogEntry, LogKind, LogSink,
    TaskLog,
};

use crate::clock::{EnvironmentClock, TimeSource};
use crate::config::AgentConfig;
use crate::error::Error;
use crate::model_client::ModelClient;
use crate::tool::{Executor as ToolExecutor, ToolRegistry};
pub use builder::AgentBuilder;

/// The result of a single step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The action was executed, the run goes on.
    Continue,
    /// The final answer tool was called with the given result.
    FinalAnswer(String),
}

/// The result of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The agent gave a final answer.
    FinalAnswer(String),
    /// The agent ran out of iterations before answering.
    MaxIterationsReached,
}

/// An agent instance, which owns its log, a model client and the tools it
/// may call.
///
/// The agent is strictly sequential: [`Agent::step`] and [`Agent::run`]
/// take `&mut self` and await the model and the tool inline, nothing is
/// spawned in the background.
pub struct Agent {
    config: AgentConfig,
    model_client: ModelClient,
    tool_executor: ToolExecutor,
    log: AgentLog,
    clock: Option<Arc<dyn EnvironmentClock>>,
    time_source: Arc<dyn TimeSource>,
    on_final_answer: Option<Box<dyn Fn(&str) + Send + Sync>>,
    previous_response_id: Option<String>,
    system_prompt_logged: bool,
}

impl Agent {
    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns the log.
    #[inline]
    pub fn log(&self) -> &AgentLog {
        &self.log
    }

    /// Returns the registered tools.
    #[inline]
    pub fn tools(&self) -> &ToolRegistry {
        self.tool_executor.tools()
    }

    /// Replaces the registered tools with a new set.
    #[inline]
    pub fn update_tools(&mut self, tools: ToolRegistry) {
        debug!("updating tools: {:?}", tools.names());
        self.tool_executor.update_tools(tools);
    }

    /// Runs the agent on a text task until it gives a final answer.
    #[inline]
    pub async fn run<S: Into<String>>(
        &mut self,
        task: S,
    ) -> Result<RunOutcome, Error> {
        self.run_with_attachments(task, vec![]).await
    }

    /// Runs the agent on a task until it gives a final answer.
    ///
    /// Recoverable errors are recorded in the log, so the model sees them
    /// on its next turn. Only fatal errors end the run with `Err`.
    pub async fn run_with_attachments<S: Into<String>>(
        &mut self,
        task: S,
        attachments: Vec<Attachment>,
    ) -> Result<RunOutcome, Error> {
        if !self.system_prompt_logged {
            let prompt = self.config.system_prompt.clone();
            self.append(LogKind::SystemPrompt(prompt));
            self.system_prompt_logged = true;
        }
        self.append(LogKind::Task(TaskLog {
            content: task.into(),
            attachments,
        }));

        for iteration in 1..=self.config.max_iterations {
            trace!("iteration {iteration}");
            match self.step().await {
                Ok(StepOutcome::Continue) => {}
                Ok(StepOutcome::FinalAnswer(answer)) => {
                    return Ok(RunOutcome::FinalAnswer(answer));
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    if let Some(kind) = err.kind() {
                        self.append(LogKind::Error(ErrorLog::new(
                            kind,
                            err.to_string(),
                        )));
                    }
                }
            }
        }

        warn!("reached max iterations ({})", self.config.max_iterations);
        self.append(LogKind::Error(ErrorLog::new(
            ErrorKind::MaxIterations,
            format!("Reached max iterations ({}).", self.config.max_iterations),
        )));
        Ok(RunOutcome::MaxIterationsReached)
    }

    fn append(&mut self, kind: LogKind) {
        let entry = LogEntry::new(
            self.time_source.now(),
            self.config.agent_id.as_str(),
            kind,
        );
        self.log.append(entry);
    }
}
