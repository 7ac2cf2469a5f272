use chrono::DateTime;
use reagent_model::LogType;
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Templates that turn log entries into prompt messages.
///
/// A template may contain the placeholders `{content}`, `{i}` (the step
/// index of the entry) and `{timestamp}` (the entry time, formatted as
/// `%Y-%m-%d %H:%M:%S` in UTC). Any other brace is kept literally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplates {
    /// Template of [`LogType::Task`] entries.
    pub task: String,
    /// Template of [`LogType::Observation`] entries.
    pub observation: String,
    /// Template of [`LogType::Error`] entries.
    pub error: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            task: "[TASK]: \n{content}\n".to_owned(),
            observation: "[OUTPUT OF STEP {i}] Observation:\n***\n{content}\n***\n"
                .to_owned(),
            error: "[OUTPUT OF STEP {i}] ERROR:\n***\n{content}\n***\n\n\
                    Now let's retry: take care not to repeat previous errors! \
                    If you have retried several times, try a completely \
                    different approach.\n"
                .to_owned(),
        }
    }
}

impl MessageTemplates {
    /// Returns the template of the given log type, if it has one.
    pub fn get(&self, ty: LogType) -> Option<&str> {
        match ty {
            LogType::Task => Some(&self.task),
            LogType::Observation => Some(&self.observation),
            LogType::Error => Some(&self.error),
            _ => None,
        }
    }
}

/// Substitutes the placeholders of `template` in a single pass, so text
/// coming from `content` is never expanded again.
pub(crate) fn render(
    template: &str,
    content: &str,
    step: usize,
    timestamp: f64,
) -> String {
    let mut rendered = String::with_capacity(template.len() + content.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{content}") {
            rendered.push_str(content);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{i}") {
            rendered.push_str(&step.to_string());
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{timestamp}") {
            rendered.push_str(&format_timestamp(timestamp));
            rest = after;
        } else {
            rendered.push('{');
            rest = &tail[1..];
        }
    }
    rendered.push_str(rest);
    rendered
}

fn format_timestamp(timestamp: f64) -> String {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
        .map(|time| time.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_placeholders() {
        let rendered = render(
            "[{i}] at {timestamp}: {content} {unknown}",
            "done {i}",
            3,
            1_700_000_000.5,
        );
        assert_eq!(rendered, "[3] at 2023-11-14 22:13:20: done {i} {unknown}");
    }

    #[test]
    fn test_default_templates() {
        let templates = MessageTemplates::default();
        let rendered = render(
            templates.get(LogType::Observation).unwrap(),
            "42",
            1,
            0.0,
        );
        assert_eq!(rendered, "[OUTPUT OF STEP 1] Observation:\n***\n42\n***\n");
        assert!(templates.get(LogType::Thought).is_none());
    }
}
