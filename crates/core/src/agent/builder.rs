use std::sync::Arc;

use reagent_model::{AgentLog, LlmEngine};

use super::Agent;
use crate::clock::{EnvironmentClock, SystemTimeSource, TimeSource};
use crate::config::AgentConfig;
use crate::error::Error;
use crate::model_client::ModelClient;
use crate::tool::{Executor as ToolExecutor, Tool, ToolRegistry};

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    config: AgentConfig,
    tools: ToolRegistry,
    clock: Option<Arc<dyn EnvironmentClock>>,
    time_source: Arc<dyn TimeSource>,
    on_final_answer: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

impl AgentBuilder {
    /// Creates a new builder with the specified engine.
    #[inline]
    pub fn with_engine<E: LlmEngine + 'static>(engine: E) -> Self {
        Self {
            model_client: ModelClient::new(engine),
            config: AgentConfig::default(),
            tools: ToolRegistry::new(),
            clock: None,
            time_source: Arc::new(SystemTimeSource),
            on_final_answer: None,
        }
    }

    /// Sets the configuration.
    #[inline]
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.add_tool(tool);
        self
    }

    /// Replaces all registered tools.
    #[inline]
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Attaches the clock of the environment the agent acts in.
    #[inline]
    pub fn with_clock(
        mut self,
        clock: impl EnvironmentClock + 'static,
    ) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Sets the source of log timestamps.
    #[inline]
    pub fn with_time_source(
        mut self,
        time_source: impl TimeSource + 'static,
    ) -> Self {
        self.time_source = Arc::new(time_source);
        self
    }

    /// Attaches a callback to be invoked with the final answer.
    #[inline]
    pub fn on_final_answer(
        mut self,
        on_final_answer: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_final_answer = Some(Box::new(on_final_answer));
        self
    }

    /// Builds the agent.
    pub fn build(self) -> Result<Agent, Error> {
        let AgentBuilder {
            model_client,
            config,
            tools,
            clock,
            time_source,
            on_final_answer,
        } = self;

        if config.simulated_generation_time.is_some() && clock.is_none() {
            return Err(Error::Config(
                "a simulated generation time requires an environment clock"
                    .to_owned(),
            ));
        }
        if config.max_iterations == 0 {
            return Err(Error::Config(
                "max_iterations must be at least 1".to_owned(),
            ));
        }

        Ok(Agent {
            model_client: model_client.with_retry(config.retry),
            config,
            tool_executor: ToolExecutor::with_tools(tools),
            log: AgentLog::new(),
            clock,
            time_source,
            on_final_answer,
            previous_response_id: None,
            system_prompt_logged: false,
        })
    }
}
