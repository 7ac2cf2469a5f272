//! Tools, the registry the model picks them from, and the executor that runs
//! the picked action.

mod error;
mod executor;
mod registry;
#[cfg(test)]
pub(crate) mod test_tools;

use std::future::ready;
use std::pin::Pin;

use reagent_model::{Observation, ToolArguments};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::{Error, ErrorKind};
pub use executor::{
    EMPTY_OBSERVATION, ExecutionOutcome, Executor, FINAL_ANSWER_TOOL_NAME,
    MOCK_OBSERVATION, MOCK_TOOL_NAME,
};
pub use registry::ToolRegistry;

/// The result of a tool call.
pub type ToolResult = Result<Observation, Error>;

type BoxedToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// A named capability the model can invoke.
///
/// The model passes either named arguments or a single positional string.
/// Named arguments are deserialized from a JSON object into
/// [`Tool::Input`], a positional argument from a JSON string, so a tool
/// taking a bare string can declare `type Input = String`.
pub trait Tool: Send + Sync + 'static {
    /// What the arguments of a call deserialize into.
    type Input: DeserializeOwned;

    /// The name the model calls the tool by.
    fn name(&self) -> &str;

    /// A description shown to the model next to the schema.
    fn description(&self) -> &str;

    /// The JSON schema of [`Tool::Input`].
    fn parameter_schema(&self) -> &Value;

    /// Runs the tool.
    ///
    /// The returned future must not borrow `self`.
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static;
}

/// Object-safe view of a [`Tool`], taking raw arguments.
pub(crate) trait ToolObject: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameter_schema(&self) -> &Value;

    fn execute(&self, arguments: &ToolArguments) -> BoxedToolFuture;
}

pub(crate) struct AnyTool<T: Tool>(pub T);

impl<T: Tool> ToolObject for AnyTool<T> {
    #[inline]
    fn name(&self) -> &str {
        self.0.name()
    }

    #[inline]
    fn description(&self) -> &str {
        self.0.description()
    }

    #[inline]
    fn parameter_schema(&self) -> &Value {
        self.0.parameter_schema()
    }

    fn execute(&self, arguments: &ToolArguments) -> BoxedToolFuture {
        match serde_json::from_value::<T::Input>(arguments.to_value()) {
            Ok(input) => Box::pin(self.0.execute(input)),
            Err(err) => Box::pin(ready(Err(
                Error::invalid_input().with_reason(err.to_string())
            ))),
        }
    }
}
