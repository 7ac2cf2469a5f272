//! The chat completions dialect.
//!
//! The raw output is a single assistant message, usually accumulated from a
//! stream by [`crate::ChatCompletionAccumulator`]. It carries a `tool_calls`
//! array and the reasoning either as `reasoning_details` or as a flat
//! `reasoning_content` string.

use reagent_model::{
    Attachment, CanonicalAction, ModelMessage, ParseError, ToolArguments,
    ToolCallResult,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::proto::AssistantMessage;

/// The reply fed back for tool calls that were proposed but not executed.
pub const SKIPPED_TOOL_CALL_REPLY: &str =
    "Skipped: only one tool call is executed per turn.";

/// Parses an assistant message into a canonical action.
///
/// Only the first tool call is executed; the ids of the others are kept in
/// [`CanonicalAction::skipped_call_ids`].
pub fn parse_output(
    output: Option<&Value>,
) -> Result<CanonicalAction, ParseError> {
    let Some(output) = output else {
        return Err(ParseError::new(
            "Could not parse the completions output due to missing output.",
        ));
    };
    let msg = AssistantMessage::deserialize(output).map_err(|err| {
        ParseError::new(format!("Could not parse the completions output: {err}"))
    })?;

    let mut tool_calls = msg.tool_calls.unwrap_or_default().into_iter();
    let Some(first) = tool_calls.next() else {
        return Err(ParseError::new(
            "Could not parse the completions output: no tool call found.",
        ));
    };
    let skipped_call_ids =
        tool_calls.map(|tc| tc.id.unwrap_or_default()).collect();

    let rationale = match msg.reasoning_details {
        Some(details) => details.into_iter().next().and_then(|d| d.text),
        None => msg.reasoning_content,
    };

    let function = first.function.unwrap_or_default();
    let arguments = function.arguments.as_deref().unwrap_or_default();
    let arguments = ToolArguments::from_json_str(arguments)?;

    Ok(CanonicalAction {
        raw_tool_call: output.clone(),
        tool_name: function.name.unwrap_or_default(),
        call_id: first.id.unwrap_or_default(),
        arguments,
        rationale,
        raw_reasoning: vec![],
        skipped_call_ids,
    })
}

/// Returns `true` if the assistant message carries neither a tool call nor
/// any content.
pub fn is_empty_output(output: &Value) -> bool {
    let has_tool_calls = output
        .get("tool_calls")
        .and_then(Value::as_array)
        .is_some_and(|calls| !calls.is_empty());
    let has_content = output
        .get("content")
        .and_then(Value::as_str)
        .is_some_and(|content| !content.trim().is_empty());
    !has_tool_calls && !has_content
}

/// Renders prompt messages into the `messages` of a chat completion
/// request.
pub fn render_input(messages: &[ModelMessage]) -> Vec<Value> {
    let mut rendered = Vec::with_capacity(messages.len());
    for msg in messages {
        match msg {
            ModelMessage::System(content) => {
                rendered.push(json!({ "role": "system", "content": content }));
            }
            ModelMessage::User {
                content,
                attachments,
            } => {
                rendered.push(user_message(content, attachments));
            }
            ModelMessage::ToolResult(result) => {
                render_tool_result(result, &mut rendered);
            }
            ModelMessage::Native(value) => rendered.push(value.clone()),
        }
    }
    rendered
}

fn render_tool_result(result: &ToolCallResult, rendered: &mut Vec<Value>) {
    rendered.push(json!({
        "role": "tool",
        "tool_call_id": result.call_id,
        "content": result.content,
    }));
    // The API expects a reply to every call of the assistant message.
    for id in &result.skipped_call_ids {
        rendered.push(json!({
            "role": "tool",
            "tool_call_id": id,
            "content": SKIPPED_TOOL_CALL_REPLY,
        }));
    }
    // Tool messages are text-only.
    if !result.attachments.is_empty() {
        rendered.push(user_message("", &result.attachments));
    }
}

fn user_message(content: &str, attachments: &[Attachment]) -> Value {
    if attachments.is_empty() {
        return json!({ "role": "user", "content": content });
    }
    let mut parts = Vec::with_capacity(attachments.len() + 1);
    if !content.is_empty() {
        parts.push(json!({ "type": "text", "text": content }));
    }
    parts.extend(attachments.iter().map(|attachment| {
        json!({
            "type": "image_url",
            "image_url": { "url": attachment.to_data_url() },
        })
    }));
    json!({ "role": "user", "content": parts })
}
