use reagent_model::ParseError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::proto::{ChatCompletionChunk, ToolCall};

/// How the accumulated reasoning is attached to the assistant message.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningFormat {
    /// A `reasoning_details` array with one `reasoning.text` entry.
    #[default]
    Details,
    /// A flat `reasoning_content` string.
    Content,
}

/// Folds streamed chat completion chunks into the complete assistant
/// message that [`crate::chat::parse_output`] consumes.
///
/// Tool calls arrive in fragments: the first fragment of a call usually
/// carries its id and name, the following ones only pieces of the
/// arguments. Fragments are matched by their `index`, or appended to the
/// latest call when the provider omits it.
#[derive(Clone, Debug, Default)]
pub struct ChatCompletionAccumulator {
    id: Option<String>,
    content: String,
    reasoning: Option<String>,
    tool_calls: Vec<ToolCall>,
    finish_reason: Option<String>,
    reasoning_format: ReasoningFormat,
}

impl ChatCompletionAccumulator {
    /// Creates an empty accumulator.
    #[inline]
    pub fn new(reasoning_format: ReasoningFormat) -> Self {
        Self {
            reasoning_format,
            ..Default::default()
        }
    }

    /// Returns the finish reason, once the stream reported one.
    #[inline]
    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    /// Feeds the data of one server-sent event.
    ///
    /// The `[DONE]` sentinel is accepted and ignored.
    pub fn push_event_data(&mut self, data: &str) -> Result<(), ParseError> {
        let data = data.trim();
        trace!("got sse event: {data}");
        if data.is_empty() || data == "[DONE]" {
            return Ok(());
        }
        let chunk = serde_json::from_str::<ChatCompletionChunk>(data)
            .map_err(|err| {
                ParseError::new(format!("Could not parse the chunk: {err}"))
            })?;
        self.push_chunk(chunk)
    }

    /// Feeds one decoded chunk.
    pub fn push_chunk(
        &mut self,
        mut chunk: ChatCompletionChunk,
    ) -> Result<(), ParseError> {
        if self.id.get_or_insert_with(|| chunk.id.clone()) != &chunk.id {
            warn!("chunk id mismatch: {}", chunk.id);
            return Err(ParseError::new("chunk id mismatch"));
        }

        let Some(choice) = chunk.choices.pop() else {
            return Ok(());
        };
        if let Some(finish_reason) = choice.finish_reason {
            self.finish_reason = Some(finish_reason);
        }

        let delta = choice.delta;
        if let Some(content) = delta.content {
            self.content.push_str(&content);
        }
        if let Some(reasoning) = delta.reasoning_content.or(delta.reasoning) {
            self.reasoning.get_or_insert_default().push_str(&reasoning);
        }
        for tool_call in delta.tool_calls.unwrap_or_default() {
            self.patch_tool_call(tool_call);
        }
        Ok(())
    }

    fn patch_tool_call(&mut self, fragment: ToolCall) {
        let existing = match fragment.index {
            Some(index) => self
                .tool_calls
                .iter_mut()
                .find(|t| t.index == Some(index)),
            // Without an index, a fragment carrying an id starts a new call
            // and anything else continues the latest one.
            None if fragment.id.is_some() => None,
            None => self.tool_calls.last_mut(),
        };
        let Some(partial) = existing else {
            self.tool_calls.push(fragment);
            return;
        };

        if let Some(id) = fragment.id {
            partial.id.get_or_insert(id);
        }
        if let Some(ty) = fragment.r#type {
            partial.r#type.get_or_insert(ty);
        }
        if let Some(function) = fragment.function {
            match partial.function {
                Some(ref mut partial_func) => {
                    if let Some(name) = function.name {
                        partial_func
                            .name
                            .get_or_insert_default()
                            .push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        partial_func
                            .arguments
                            .get_or_insert_default()
                            .push_str(&arguments);
                    }
                }
                None => partial.function = Some(function),
            }
        }
    }

    /// Finishes the stream and returns the assistant message.
    pub fn finish(self) -> Value {
        let mut msg = Map::new();
        msg.insert("role".to_owned(), json!("assistant"));
        msg.insert("content".to_owned(), json!(self.content));

        let tool_calls: Vec<Value> = self
            .tool_calls
            .into_iter()
            .map(|call| {
                let function = call.function.unwrap_or_default();
                json!({
                    "id": call.id.unwrap_or_default(),
                    "type": call.r#type.unwrap_or_else(|| "function".to_owned()),
                    "function": {
                        "name": function.name.unwrap_or_default(),
                        "arguments": function.arguments.unwrap_or_default(),
                    },
                })
            })
            .collect();
        msg.insert("tool_calls".to_owned(), Value::Array(tool_calls));

        let reasoning = self.reasoning.unwrap_or_default();
        match self.reasoning_format {
            ReasoningFormat::Details => {
                msg.insert(
                    "reasoning_details".to_owned(),
                    json!([{
                        "type": "reasoning.text",
                        "text": reasoning,
                        "format": "unknown",
                        "index": 0,
                    }]),
                );
            }
            ReasoningFormat::Content => {
                msg.insert("reasoning_content".to_owned(), json!(reasoning));
            }
        }
        Value::Object(msg)
    }
}
