use std::collections::BTreeMap;

use reagent_model::ModelTool;

use crate::tool::{AnyTool, Tool, ToolObject};

/// The set of tools an agent may call, keyed by name.
///
/// The registry is never mutated while an agent runs. To change the
/// available tools, build a new registry and hand it to
/// [`crate::Agent::update_tools`], which replaces the old one wholesale.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn ToolObject>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool, replacing any tool with the same name.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.add_tool(tool);
        self
    }

    /// Registers a tool, replacing any tool with the same name.
    pub fn add_tool<T: Tool>(&mut self, tool: T) {
        let name = tool.name().to_owned();
        if self.tools.insert(name, Box::new(AnyTool(tool))).is_some() {
            debug!("replaced a registered tool");
        }
    }

    /// Returns the names of all registered tools, in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Returns the definitions sent to the model, sorted by name.
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.tools
            .values()
            .map(|tool| ModelTool {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: tool.parameter_schema().clone(),
            })
            .collect()
    }

    #[inline]
    pub(crate) fn get(&self, name: &str) -> Option<&dyn ToolObject> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use reagent_model::ToolArguments;
    use serde_json::json;

    use super::*;
    use crate::tool::test_tools::{EchoTool, SendTool};

    #[test]
    fn test_sorted_definitions() {
        let registry = ToolRegistry::new()
            .with_tool(SendTool::default())
            .with_tool(EchoTool::default());

        assert_eq!(registry.names(), ["echo", "send"]);
        let definitions = registry.definitions();
        assert_eq!(definitions[0].name, "echo");
        assert_eq!(definitions[1].name, "send");
        assert_eq!(definitions[1].parameters["properties"]["to"]["type"], "string");
    }

    #[tokio::test]
    async fn test_argument_forms() {
        let registry = ToolRegistry::new()
            .with_tool(SendTool::default())
            .with_tool(EchoTool::default());

        let send = registry.get("send").unwrap();
        let args = ToolArguments::from_value(json!({ "to": "bob" })).unwrap();
        let observation = send.execute(&args).await.unwrap();
        assert_eq!(observation.content().trim(), "Sent to bob");

        let echo = registry.get("echo").unwrap();
        let args = ToolArguments::Positional("ping".to_owned());
        assert_eq!(echo.execute(&args).await.unwrap().content(), "ping");

        // A positional argument can't feed a tool taking named arguments.
        let err = send.execute(&args).await.unwrap_err();
        assert_eq!(err.kind(), crate::tool::ErrorKind::InvalidInput);
    }
}
