use std::future::ready;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use reagent_model::{Attachment, Observation};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use crate::tool::{Error, Tool, ToolResult};

static NULL_SCHEMA: Value = Value::Null;

#[derive(Deserialize, JsonSchema)]
pub struct SendInput {
    /// The recipient.
    pub to: String,
}

/// Sends nothing, but counts how many times it was called.
pub struct SendTool {
    schema: Value,
    pub calls: Arc<AtomicUsize>,
}

impl Default for SendTool {
    fn default() -> Self {
        Self {
            schema: schema_for!(SendInput).to_value(),
            calls: Default::default(),
        }
    }
}

impl Tool for SendTool {
    type Input = SendInput;

    fn name(&self) -> &str {
        "send"
    }

    fn description(&self) -> &str {
        "Sends a message"
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ready(Ok(Observation::from(format!("  Sent to {}\n", input.to))))
    }
}

/// Returns its positional argument.
pub struct EchoTool {
    schema: Value,
}

impl Default for EchoTool {
    fn default() -> Self {
        Self {
            schema: schema_for!(String).to_value(),
        }
    }
}

impl Tool for EchoTool {
    type Input = String;

    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes the input"
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(Observation::from(input)))
    }
}

/// A tool with no input that produces a fixed result.
pub struct FixedTool {
    pub name: &'static str,
    pub result: ToolResult,
}

impl FixedTool {
    pub fn failing(reason: &str) -> Self {
        Self {
            name: "fail",
            result: Err(Error::execution_error().with_reason(reason)),
        }
    }

    pub fn logged(reason: &str) -> Self {
        Self {
            name: "logged",
            result: Err(Error::logged().with_reason(reason)),
        }
    }

    pub fn empty() -> Self {
        Self {
            name: "empty",
            result: Ok(Observation::from("")),
        }
    }

    pub fn snapshot() -> Self {
        Self {
            name: "snapshot",
            result: Ok(Observation::Multimodal {
                content: "Here it is".to_owned(),
                attachments: vec![Attachment::new(
                    mime::IMAGE_PNG,
                    &b"png"[..],
                )],
            }),
        }
    }
}

impl Tool for FixedTool {
    type Input = Value;

    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "A fixed tool"
    }

    fn parameter_schema(&self) -> &Value {
        &NULL_SCHEMA
    }

    fn execute(
        &self,
        _input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(self.result.clone())
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct FinalAnswerInput {
    /// The answer to the task.
    pub answer: String,
}

/// The terminal tool.
pub struct FinalAnswerTool {
    schema: Value,
}

impl Default for FinalAnswerTool {
    fn default() -> Self {
        Self {
            schema: schema_for!(FinalAnswerInput).to_value(),
        }
    }
}

impl Tool for FinalAnswerTool {
    type Input = FinalAnswerInput;

    fn name(&self) -> &str {
        "final_answer"
    }

    fn description(&self) -> &str {
        "Provides the final answer to the task"
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(Observation::from(input.answer)))
    }
}
