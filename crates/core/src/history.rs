//! Rebuilding the prompt from the agent log.
//!
//! The history is recomputed from scratch before every model call. The
//! builder only reads the log, so building twice over the same entries
//! yields the same messages.

use reagent_model::{
    ErrorKind, ErrorLog, LogEntry, LogKind, LogType, ModelMessage,
    ObservationLog, ToolCallResult,
};

use crate::template::{MessageTemplates, render};

const TRUNCATED_EDGE_CHARS: usize = 100;
const TRUNCATION_MARKER: &str = "\n[...]\n";

/// Options of [`build_history`] that stay fixed for an agent.
#[derive(Clone, Copy, Debug)]
pub struct HistoryOptions<'a> {
    /// Templates of the textual messages.
    pub templates: &'a MessageTemplates,
    /// Whether an observation that overflowed the context is replaced by a
    /// truncated view.
    pub handle_prompt_too_long: bool,
}

/// Builds the prompt messages from the log entries.
///
/// Entries whose type is in `excluded` are skipped. If
/// `until_last_assistant` is set, everything before the last tool call is
/// skipped as well, for providers that keep the earlier turns server-side.
///
/// The step index substituted for `{i}` counts every observation and error
/// entry, including the skipped ones.
pub fn build_history(
    entries: &[LogEntry],
    excluded: &[LogType],
    until_last_assistant: bool,
    options: &HistoryOptions<'_>,
) -> Vec<ModelMessage> {
    let start = if until_last_assistant {
        entries
            .iter()
            .rposition(|entry| entry.log_type() == LogType::ToolCall)
            .unwrap_or(0)
    } else {
        0
    };

    let mut history = Vec::new();
    let mut step = 0;
    // The latest observation not yet replaced by a truncated view, with the
    // position of the tool result it produced, if any.
    let mut pending_observation: Option<(&ObservationLog, Option<usize>)> =
        None;

    for (index, entry) in entries.iter().enumerate() {
        let ty = entry.log_type();
        if matches!(ty, LogType::Observation | LogType::Error) {
            step += 1;
        }
        if index < start || excluded.contains(&ty) {
            continue;
        }
        let template = options.templates.get(ty);
        let render_with = |content: &str| {
            template.map(|template| {
                render(template, content, step, entry.timestamp)
            })
        };

        match &entry.kind {
            LogKind::SystemPrompt(prompt) => {
                if !prompt.is_empty() {
                    history.push(ModelMessage::System(prompt.clone()));
                }
            }
            LogKind::Task(task) => {
                if task.content.is_empty() {
                    continue;
                }
                if let Some(content) = render_with(&task.content) {
                    history.push(ModelMessage::User {
                        content,
                        attachments: task.attachments.clone(),
                    });
                }
            }
            LogKind::Rationale(rationale) => {
                let blocks = rationale.raw_reasoning.iter().cloned();
                history.extend(blocks.map(ModelMessage::Native));
            }
            LogKind::ToolCall(call) => {
                history.push(ModelMessage::Native(call.raw_tool_call.clone()));
            }
            LogKind::Observation(observation) => {
                pending_observation = Some((observation, None));
                if observation.content.is_empty()
                    && observation.attachments.is_empty()
                {
                    continue;
                }
                if let Some(content) = render_with(&observation.content) {
                    history.push(ModelMessage::ToolResult(ToolCallResult {
                        call_id: observation.call_id.clone(),
                        content,
                        attachments: observation.attachments.clone(),
                        skipped_call_ids: observation.skipped_call_ids.clone(),
                    }));
                    pending_observation =
                        Some((observation, Some(history.len() - 1)));
                }
            }
            LogKind::Error(error) => {
                let content = match error.kind {
                    ErrorKind::MaxIterations => continue,
                    ErrorKind::PromptTooLong
                        if options.handle_prompt_too_long =>
                    {
                        match pending_observation.take() {
                            Some((observation, position)) => {
                                if let Some(position) = position {
                                    history.remove(position);
                                }
                                flooded_context_content(error, observation)
                            }
                            None => error.content(),
                        }
                    }
                    _ => error.content(),
                };
                if let Some(content) = render_with(&content) {
                    history.push(ModelMessage::user(content));
                }
            }
            LogKind::Thought(_)
            | LogKind::LlmInput(_)
            | LogKind::LlmOutputThoughtAction(_)
            | LogKind::FinalAnswer(_) => {}
        }
    }
    history
}

fn flooded_context_content(
    error: &ErrorLog,
    observation: &ObservationLog,
) -> String {
    let message = format!(
        "{}\nObservation was removed because it possibly flooded the \
         context. Truncated observation (first {TRUNCATED_EDGE_CHARS} + \
         [...] + last {TRUNCATED_EDGE_CHARS} chars):\n{}",
        error.message,
        truncate_middle(&observation.content),
    );
    error.content_with_message(&message)
}

/// Keeps the first and last 100 characters of `text`.
fn truncate_middle(text: &str) -> String {
    let len = text.chars().count();
    if len <= TRUNCATED_EDGE_CHARS * 2 {
        return text.to_owned();
    }
    let head: String = text.chars().take(TRUNCATED_EDGE_CHARS).collect();
    let tail: String = text.chars().skip(len - TRUNCATED_EDGE_CHARS).collect();
    format!("{head}{TRUNCATION_MARKER}{tail}")
}
