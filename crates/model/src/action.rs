use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ParseError;

/// The separator between the app name and the action name of a tool.
pub const APP_ACTION_SEPARATOR: &str = "__";

/// Arguments of a tool call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolArguments {
    /// Named arguments.
    Keyword(Map<String, Value>),
    /// A single positional string argument.
    Positional(String),
}

impl ToolArguments {
    /// Interprets a decoded argument payload.
    ///
    /// Objects become keyword arguments, strings become a positional
    /// argument, and `null` is treated as no arguments at all.
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Object(map) => Ok(Self::Keyword(map)),
            Value::String(s) => Ok(Self::Positional(s)),
            Value::Null => Ok(Self::default()),
            other => Err(ParseError::new(format!(
                "Could not parse the arguments: expected an object or a \
                 string, got {other}"
            ))),
        }
    }

    /// Decodes a JSON-encoded argument string.
    pub fn from_json_str(s: &str) -> Result<Self, ParseError> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        let value = serde_json::from_str(s).map_err(|err| {
            ParseError::new(format!(
                "Could not parse the arguments due to invalid JSON: {err}"
            ))
        })?;
        Self::from_value(value)
    }

    /// Returns the arguments as a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Keyword(map) => Value::Object(map.clone()),
            Self::Positional(s) => Value::String(s.clone()),
        }
    }
}

impl Default for ToolArguments {
    #[inline]
    fn default() -> Self {
        Self::Keyword(Map::new())
    }
}

/// A dialect-independent action extracted from the model output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalAction {
    /// The provider-native tool call, replayed verbatim in the history.
    pub raw_tool_call: Value,
    /// Name of the tool to call.
    pub tool_name: String,
    /// Identifier of the tool call.
    pub call_id: String,
    /// Arguments to pass to the tool.
    pub arguments: ToolArguments,
    /// The reasoning accompanying the call, if the model produced any.
    pub rationale: Option<String>,
    /// Provider-native reasoning blocks, needed for conversation
    /// continuity with stateful APIs.
    pub raw_reasoning: Vec<Value>,
    /// Identifiers of extra tool calls that were proposed but not executed.
    pub skipped_call_ids: Vec<String>,
}

/// A [`CanonicalAction`] with its tool name split into app and action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAction {
    /// Name of the tool to call.
    pub tool_name: String,
    /// The app part of the tool name.
    pub app_name: String,
    /// The action part of the tool name, if it has a separator.
    pub action_name: Option<String>,
    /// Identifier of the tool call.
    pub call_id: String,
    /// Arguments to pass to the tool.
    pub arguments: ToolArguments,
    /// The reasoning accompanying the call.
    pub rationale: Option<String>,
    /// Provider-native reasoning blocks.
    pub raw_reasoning: Vec<Value>,
    /// The provider-native tool call.
    pub raw_tool_call: Value,
    /// Identifiers of extra tool calls that were not executed.
    pub skipped_call_ids: Vec<String>,
}

impl From<CanonicalAction> for ParsedAction {
    fn from(action: CanonicalAction) -> Self {
        let (app_name, action_name) =
            match action.tool_name.split_once(APP_ACTION_SEPARATOR) {
                Some((app, name)) => (app.to_owned(), Some(name.to_owned())),
                None => (action.tool_name.clone(), None),
            };
        Self {
            tool_name: action.tool_name,
            app_name,
            action_name,
            call_id: action.call_id,
            arguments: action.arguments,
            rationale: action.rationale,
            raw_reasoning: action.raw_reasoning,
            raw_tool_call: action.raw_tool_call,
            skipped_call_ids: action.skipped_call_ids,
        }
    }
}
