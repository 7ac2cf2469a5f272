//! The responses dialect.
//!
//! The raw output is the ordered list of output blocks of a response.
//! Reasoning blocks are interleaved with the function call block, and must
//! be replayed verbatim on the next turn for the provider to keep its chain
//! of thought.

use reagent_model::{
    Attachment, CanonicalAction, ModelMessage, ParseError, ToolArguments,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::proto::{FunctionCallBlock, ReasoningBlock, block_type};

/// The rationale used when the model did not produce any reasoning.
pub const NO_RATIONALE_PLACEHOLDER: &str = "No thoughts needed.";

/// Parses the output blocks of a response into a canonical action.
///
/// Any block type other than `reasoning` and `function_call` is rejected.
/// When more than one function call is present, the first one is executed
/// and the ids of the others are kept in
/// [`CanonicalAction::skipped_call_ids`].
pub fn parse_output(
    output: Option<&Value>,
) -> Result<CanonicalAction, ParseError> {
    let Some(output) = output else {
        return Err(ParseError::new(
            "Could not parse the responses output due to missing output.",
        ));
    };
    let Some(blocks) = output.as_array() else {
        return Err(ParseError::new(
            "Could not parse the responses output: expected a list of blocks.",
        ));
    };

    let mut summaries = Vec::new();
    let mut raw_reasoning = Vec::new();
    let mut function_call: Option<(FunctionCallBlock, &Value)> = None;
    let mut skipped_call_ids = Vec::new();

    for block in blocks {
        match block_type(block) {
            Some("reasoning") => {
                let reasoning = decode::<ReasoningBlock>(block)?;
                summaries.extend(reasoning.summary.into_iter().map(|s| s.text));
                let mut raw = block.clone();
                if let Some(fields) = raw.as_object_mut() {
                    fields.remove("status");
                }
                raw_reasoning.push(raw);
            }
            Some("function_call") => {
                let call = decode::<FunctionCallBlock>(block)?;
                if function_call.is_some() {
                    skipped_call_ids.push(call.call_id);
                } else {
                    function_call = Some((call, block));
                }
            }
            Some(other) => {
                return Err(ParseError::new(format!(
                    "Unknown block type: {other}"
                )));
            }
            None => {
                return Err(ParseError::new("Block without a type"));
            }
        }
    }

    let Some((call, raw_tool_call)) = function_call else {
        return Err(ParseError::new(
            "Could not parse the responses output: no function call found.",
        ));
    };
    let rationale = if summaries.is_empty() {
        NO_RATIONALE_PLACEHOLDER.to_owned()
    } else {
        summaries.join("\n\n")
    };

    Ok(CanonicalAction {
        raw_tool_call: raw_tool_call.clone(),
        arguments: ToolArguments::from_json_str(&call.arguments)?,
        tool_name: call.name,
        call_id: call.call_id,
        rationale: Some(rationale),
        raw_reasoning,
        skipped_call_ids,
    })
}

/// Returns `true` if the output has no blocks besides reasoning.
pub fn is_empty_output(output: &Value) -> bool {
    let Some(blocks) = output.as_array() else {
        return true;
    };
    blocks
        .iter()
        .all(|block| block_type(block) == Some("reasoning"))
}

/// Renders prompt messages into the `input` of a responses request.
pub fn render_input(messages: &[ModelMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|msg| match msg {
            ModelMessage::System(content) => {
                json!({ "role": "developer", "content": content })
            }
            ModelMessage::User {
                content,
                attachments,
            } => json!({
                "role": "user",
                "content": content_parts(content, attachments),
            }),
            ModelMessage::ToolResult(result) => json!({
                "type": "function_call_output",
                "call_id": result.call_id,
                "output": content_parts(&result.content, &result.attachments),
            }),
            ModelMessage::Native(value) => value.clone(),
        })
        .collect()
}

fn content_parts(text: &str, attachments: &[Attachment]) -> Vec<Value> {
    let mut parts = Vec::with_capacity(attachments.len() + 1);
    parts.push(json!({ "type": "input_text", "text": text }));
    parts.extend(attachments.iter().map(|attachment| {
        json!({ "type": "input_image", "image_url": attachment.to_data_url() })
    }));
    parts
}

fn decode<'a, T: Deserialize<'a>>(block: &'a Value) -> Result<T, ParseError> {
    T::deserialize(block).map_err(|err| {
        ParseError::new(format!("Could not parse the given block: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use reagent_model::ToolCallResult;

    use super::*;

    fn reasoning(texts: &[&str]) -> Value {
        let summary: Vec<Value> = texts
            .iter()
            .map(|text| json!({ "type": "summary_text", "text": text }))
            .collect();
        json!({
            "type": "reasoning",
            "id": "rs_1",
            "status": "completed",
            "summary": summary,
            "encrypted_content": "opaque",
        })
    }

    fn function_call(call_id: &str) -> Value {
        json!({
            "type": "function_call",
            "id": format!("fc_{call_id}"),
            "call_id": call_id,
            "name": "Calendar__add_event",
            "arguments": "{\"title\":\"Standup\"}",
        })
    }

    #[test]
    fn test_parse_with_reasoning() {
        let output = json!([
            reasoning(&["First.", "Second."]),
            function_call("call_1"),
        ]);
        let action = parse_output(Some(&output)).unwrap();

        assert_eq!(action.tool_name, "Calendar__add_event");
        assert_eq!(action.call_id, "call_1");
        assert_eq!(action.rationale.as_deref(), Some("First.\n\nSecond."));
        assert_eq!(action.arguments.to_value(), json!({ "title": "Standup" }));
        assert_eq!(action.raw_tool_call, function_call("call_1"));

        assert_eq!(action.raw_reasoning.len(), 1);
        assert!(action.raw_reasoning[0].get("status").is_none());
        assert_eq!(action.raw_reasoning[0]["encrypted_content"], "opaque");
    }

    #[test]
    fn test_parse_without_reasoning() {
        let output = json!([function_call("call_1")]);
        let action = parse_output(Some(&output)).unwrap();
        assert_eq!(action.rationale.as_deref(), Some(NO_RATIONALE_PLACEHOLDER));
        assert!(action.raw_reasoning.is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_blocks() {
        let output = json!([
            reasoning(&["Let me answer."]),
            { "type": "message", "content": [] },
            function_call("call_1"),
        ]);
        let err = parse_output(Some(&output)).unwrap_err();
        assert_eq!(err.message(), "Unknown block type: message");
    }

    #[test]
    fn test_parse_failures() {
        assert!(parse_output(None).is_err());
        assert!(parse_output(Some(&json!({}))).is_err());
        assert!(parse_output(Some(&json!([reasoning(&["hm"])]))).is_err());

        let mut bad_args = function_call("call_1");
        bad_args["arguments"] = json!("{");
        assert!(parse_output(Some(&json!([bad_args]))).is_err());
    }

    #[test]
    fn test_parse_extra_function_calls() {
        let output = json!([function_call("call_1"), function_call("call_2")]);
        let action = parse_output(Some(&output)).unwrap();
        assert_eq!(action.call_id, "call_1");
        assert_eq!(action.skipped_call_ids, ["call_2"]);
    }

    #[test]
    fn test_is_empty_output() {
        assert!(is_empty_output(&json!([])));
        assert!(is_empty_output(&json!([reasoning(&["hm"])])));
        assert!(!is_empty_output(&json!([function_call("call_1")])));
    }

    #[test]
    fn test_render_tool_result() {
        let attachment = Attachment::new(mime::IMAGE_PNG, &b"png"[..]);
        let rendered = render_input(&[
            ModelMessage::System("sys".to_owned()),
            ModelMessage::ToolResult(ToolCallResult {
                call_id: "call_1".to_owned(),
                content: "done".to_owned(),
                attachments: vec![attachment],
                skipped_call_ids: vec![],
            }),
        ]);
        assert_eq!(rendered[0]["role"], "developer");
        assert_eq!(rendered[1]["type"], "function_call_output");
        assert_eq!(rendered[1]["output"][0]["text"], "done");
        assert_eq!(
            rendered[1]["output"][1]["image_url"],
            "data:image/png;base64,cG5n"
        );
    }
}
