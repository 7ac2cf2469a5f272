use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// What the scripted engine returns for one call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PresetTurn {
    /// Returns the given raw output.
    Output(Value),
    /// Returns a response without any output.
    Missing,
    /// Fails with the given error kind.
    Failure(PresetFailure),
}

/// Serializable mirror of [`reagent_model::EngineErrorKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetFailure {
    /// See [`reagent_model::EngineErrorKind::Moderated`].
    Moderated,
    /// See [`reagent_model::EngineErrorKind::RateLimitExceeded`].
    RateLimitExceeded,
    /// See [`reagent_model::EngineErrorKind::PromptTooLong`].
    PromptTooLong,
    /// See [`reagent_model::EngineErrorKind::Other`].
    Other,
}

impl PresetTurn {
    /// A chat-dialect assistant message calling one tool.
    pub fn chat_tool_call(
        call_id: &str,
        tool_name: &str,
        arguments: Value,
        reasoning: &str,
    ) -> Self {
        PresetTurn::Output(json!({
            "role": "assistant",
            "content": "",
            "tool_calls": [{
                "id": call_id,
                "type": "function",
                "function": {
                    "name": tool_name,
                    "arguments": arguments.to_string(),
                },
            }],
            "reasoning_content": reasoning,
        }))
    }

    /// A responses-dialect output with one reasoning block and one function
    /// call block.
    pub fn responses_tool_call(
        call_id: &str,
        tool_name: &str,
        arguments: Value,
        reasoning: &str,
    ) -> Self {
        PresetTurn::Output(json!([
            {
                "type": "reasoning",
                "id": format!("rs_{call_id}"),
                "summary": [{ "type": "summary_text", "text": reasoning }],
            },
            {
                "type": "function_call",
                "id": format!("fc_{call_id}"),
                "call_id": call_id,
                "name": tool_name,
                "arguments": arguments.to_string(),
            },
        ]))
    }

    /// An assistant message with no tool call and no content.
    pub fn chat_empty() -> Self {
        PresetTurn::Output(json!({
            "role": "assistant",
            "content": "",
            "tool_calls": [],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let turns = vec![
            PresetTurn::chat_tool_call("a", "send", json!({ "x": 1 }), "ok"),
            PresetTurn::Missing,
            PresetTurn::Failure(PresetFailure::PromptTooLong),
        ];

        let serialized = serde_json::to_string(&turns).unwrap();
        let deserialized: Vec<PresetTurn> =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(turns, deserialized);
    }
}
