use reagent_model::{
    LogEntry, LogKind, LogSink, Observation, ObservationLog, ParseError,
    ParsedAction, RationaleLog, ToolCallLog,
};
use tracing::Instrument;

use crate::clock::TimeSource;
use crate::error::Error;
use crate::tool::ToolRegistry;

/// The reserved tool name that ends a run.
pub const FINAL_ANSWER_TOOL_NAME: &str = "final_answer";

/// A tool name that is answered with [`MOCK_OBSERVATION`] without looking
/// at the registry.
pub const MOCK_TOOL_NAME: &str = "_mock";

/// The observation of [`MOCK_TOOL_NAME`].
pub const MOCK_OBSERVATION: &str = "Mocked observation";

/// The logged content of an observation with neither text nor attachments.
pub const EMPTY_OBSERVATION: &str = "No observation";

/// What the caller should do after an action was executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Keep stepping.
    Continue,
    /// The final answer tool was called with the given result.
    FinalAnswer(String),
}

/// Runs parsed actions against the registered tools.
#[derive(Default)]
pub struct Executor {
    tools: ToolRegistry,
}

impl Executor {
    /// Creates an executor over the given tools.
    #[inline]
    pub fn with_tools(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    /// Returns the registered tools.
    #[inline]
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Replaces the registered tools.
    #[inline]
    pub fn update_tools(&mut self, tools: ToolRegistry) {
        self.tools = tools;
    }

    /// Executes an action and records it in the log.
    ///
    /// Entries are appended in causal order: the rationale (if any), the
    /// tool call, the observation and finally the final answer. An entry is
    /// written even if a later stage fails, so a failing tool still leaves
    /// its call in the log.
    pub async fn execute_parsed_action(
        &self,
        action: &ParsedAction,
        sink: &mut dyn LogSink,
        time: &dyn TimeSource,
        agent_id: &str,
    ) -> Result<ExecutionOutcome, Error> {
        let mut append =
            |kind| sink.append(LogEntry::new(time.now(), agent_id, kind));

        if action.tool_name.is_empty() {
            error!("the model output has no tool name");
            return Err(ParseError::new("error parsing the tool_name").into());
        }
        if let Some(rationale) = &action.rationale {
            append(LogKind::Rationale(RationaleLog {
                content: rationale.clone(),
                raw_reasoning: action.raw_reasoning.clone(),
            }));
        }
        append(LogKind::ToolCall(ToolCallLog {
            tool_name: action.tool_name.clone(),
            arguments: action.arguments.clone(),
            call_id: action.call_id.clone(),
            raw_tool_call: action.raw_tool_call.clone(),
        }));

        let observation = self
            .execute_tool_call(action)
            .instrument(debug_span!("tool executor", tool = %action.tool_name))
            .await?;

        let attachments = observation.attachments().to_vec();
        let mut content = observation.content().trim().to_owned();
        if content.is_empty() && attachments.is_empty() {
            content = EMPTY_OBSERVATION.to_owned();
        }
        append(LogKind::Observation(ObservationLog {
            content: content.clone(),
            attachments,
            call_id: action.call_id.clone(),
            skipped_call_ids: action.skipped_call_ids.clone(),
        }));

        if action.tool_name == FINAL_ANSWER_TOOL_NAME {
            append(LogKind::FinalAnswer(content.clone()));
            return Ok(ExecutionOutcome::FinalAnswer(content));
        }
        Ok(ExecutionOutcome::Continue)
    }

    /// Calls the tool named by the action, without logging anything.
    pub async fn execute_tool_call(
        &self,
        action: &ParsedAction,
    ) -> Result<Observation, Error> {
        if action.tool_name == MOCK_TOOL_NAME {
            return Ok(Observation::from(MOCK_OBSERVATION));
        }
        let Some(tool) = self.tools.get(&action.tool_name) else {
            let message = format!(
                "Error: unknown tool {}, should be instead one of {:?}",
                action.tool_name,
                self.tools.names()
            );
            error!("{message}");
            return Err(Error::UnavailableTool(message));
        };

        debug!(
            "calling tool ({}) with args: {:?}",
            action.call_id, action.arguments
        );
        match tool.execute(&action.arguments).await {
            Ok(observation) => Ok(observation),
            Err(err) if err.is_logged() => {
                debug!("{err}");
                Err(Error::Logged(err.into_reason()))
            }
            Err(err) => {
                let message = format!(
                    "Error in tool call execution: {}\n\
                     You should only use this tool with a correct input.\n\
                     As a reminder, this tool's description is the following:\n\
                     - {}: {}\n    Takes inputs: {}",
                    err.into_reason(),
                    tool.name(),
                    tool.description(),
                    tool.parameter_schema()
                );
                error!("{message}");
                Err(Error::Execution(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use reagent_model::{AgentLog, CanonicalAction, LogType, ToolArguments};
    use serde_json::{Value, json};

    use super::*;
    use crate::clock::SystemTimeSource;
    use crate::tool::test_tools::{
        EchoTool, FinalAnswerTool, FixedTool, SendTool,
    };

    fn action(tool_name: &str, arguments: Value) -> ParsedAction {
        ParsedAction::from(CanonicalAction {
            raw_tool_call: json!({ "name": tool_name }),
            tool_name: tool_name.to_owned(),
            call_id: "call_1".to_owned(),
            arguments: ToolArguments::from_value(arguments).unwrap(),
            rationale: None,
            raw_reasoning: vec![],
            skipped_call_ids: vec![],
        })
    }

    async fn execute(
        executor: &Executor,
        action: &ParsedAction,
        log: &mut AgentLog,
    ) -> Result<ExecutionOutcome, Error> {
        executor
            .execute_parsed_action(action, log, &SystemTimeSource, "agent")
            .await
    }

    fn types(log: &AgentLog) -> Vec<LogType> {
        log.entries().iter().map(|e| e.log_type()).collect()
    }

    fn last_observation(log: &AgentLog) -> &ObservationLog {
        log.entries()
            .iter()
            .rev()
            .find_map(|entry| match &entry.kind {
                LogKind::Observation(observation) => Some(observation),
                _ => None,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_execute_in_order() {
        let tools = ToolRegistry::new().with_tool(SendTool::default());
        let executor = Executor::with_tools(tools);
        let mut action = action("send", json!({ "to": "bob" }));
        action.rationale = Some("Bob asked for it.".to_owned());
        action.skipped_call_ids = vec!["call_2".to_owned()];

        let mut log = AgentLog::new();
        let outcome = execute(&executor, &action, &mut log).await.unwrap();

        assert_eq!(outcome, ExecutionOutcome::Continue);
        assert_eq!(
            types(&log),
            [LogType::Rationale, LogType::ToolCall, LogType::Observation]
        );
        let observation = last_observation(&log);
        assert_eq!(observation.content, "Sent to bob");
        assert_eq!(observation.call_id, "call_1");
        assert_eq!(observation.skipped_call_ids, ["call_2"]);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let send = SendTool::default();
        let calls = Arc::clone(&send.calls);
        let executor = Executor::with_tools(ToolRegistry::new().with_tool(send));

        let mut log = AgentLog::new();
        let err = execute(&executor, &action("unknown", json!({})), &mut log)
            .await
            .unwrap_err();

        let Error::UnavailableTool(message) = err else {
            panic!("expected an unavailable tool error, got {err:?}");
        };
        assert_eq!(
            message,
            r#"Error: unknown tool unknown, should be instead one of ["send"]"#
        );
        assert_eq!(types(&log), [LogType::ToolCall]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mock_tool() {
        for executor in [
            Executor::default(),
            Executor::with_tools(
                ToolRegistry::new().with_tool(SendTool::default()),
            ),
        ] {
            let mut log = AgentLog::new();
            execute(&executor, &action(MOCK_TOOL_NAME, json!({})), &mut log)
                .await
                .unwrap();

            let observations = types(&log)
                .into_iter()
                .filter(|ty| *ty == LogType::Observation)
                .count();
            assert_eq!(observations, 1);
            assert_eq!(last_observation(&log).content, MOCK_OBSERVATION);
        }
    }

    #[tokio::test]
    async fn test_missing_tool_name() {
        let executor = Executor::default();
        let mut action = action("", json!({}));
        action.rationale = Some("hm".to_owned());

        let mut log = AgentLog::new();
        let err = execute(&executor, &action, &mut log).await.unwrap_err();
        assert!(matches!(err, Error::Parsing(_)));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_tool_errors() {
        let executor = Executor::with_tools(
            ToolRegistry::new()
                .with_tool(FixedTool::failing("disk full"))
                .with_tool(FixedTool::logged("quota exceeded"))
                .with_tool(SendTool::default()),
        );
        let mut log = AgentLog::new();

        let err = execute(&executor, &action("fail", json!({})), &mut log)
            .await
            .unwrap_err();
        let Error::Execution(message) = err else {
            panic!("expected an execution error, got {err:?}");
        };
        assert!(message.starts_with("Error in tool call execution: disk full\n"));
        assert!(message.contains("- fail: A fixed tool"));

        let err = execute(&executor, &action("logged", json!({})), &mut log)
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::Logged(ref reason) if reason == "quota exceeded")
        );

        // Invalid input is an execution error showing the schema.
        let bad_input = action("send", json!({ "x": 1 }));
        let err = execute(&executor, &bad_input, &mut log).await.unwrap_err();
        let Error::Execution(message) = err else {
            panic!("expected an execution error, got {err:?}");
        };
        assert!(message.contains("missing field `to`"));
        assert!(message.contains(r#""required":["to"]"#));

        assert!(!types(&log).contains(&LogType::Observation));
    }

    #[tokio::test]
    async fn test_observation_content() {
        let executor = Executor::with_tools(
            ToolRegistry::new()
                .with_tool(FixedTool::empty())
                .with_tool(FixedTool::snapshot())
                .with_tool(EchoTool::default()),
        );
        let mut log = AgentLog::new();

        execute(&executor, &action("empty", json!({})), &mut log)
            .await
            .unwrap();
        assert_eq!(last_observation(&log).content, EMPTY_OBSERVATION);

        execute(&executor, &action("snapshot", json!({})), &mut log)
            .await
            .unwrap();
        let observation = last_observation(&log);
        assert_eq!(observation.content, "Here it is");
        assert_eq!(observation.attachments.len(), 1);

        execute(&executor, &action("echo", json!("  padded  ")), &mut log)
            .await
            .unwrap();
        assert_eq!(last_observation(&log).content, "padded");
    }

    #[tokio::test]
    async fn test_final_answer() {
        let executor = Executor::with_tools(
            ToolRegistry::new().with_tool(FinalAnswerTool::default()),
        );
        let action = action(FINAL_ANSWER_TOOL_NAME, json!({ "answer": "42" }));

        let mut log = AgentLog::new();
        let outcome = execute(&executor, &action, &mut log).await.unwrap();

        assert_eq!(outcome, ExecutionOutcome::FinalAnswer("42".to_owned()));
        assert_eq!(
            types(&log),
            [LogType::ToolCall, LogType::Observation, LogType::FinalAnswer]
        );
    }
}
