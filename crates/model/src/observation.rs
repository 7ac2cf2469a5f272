use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use mime::Mime;
use serde_json::Value;

/// A binary unit attached to a task or an observation, such as an image.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attachment {
    /// The media type of the data.
    pub mime: Mime,
    /// The raw data.
    pub data: Bytes,
}

impl Attachment {
    /// Creates a new attachment.
    #[inline]
    pub fn new<B: Into<Bytes>>(mime: Mime, data: B) -> Self {
        Self {
            mime,
            data: data.into(),
        }
    }

    /// Encodes the attachment as a base64 `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }

    /// Returns `true` if the attachment is an image.
    #[inline]
    pub fn is_image(&self) -> bool {
        self.mime.type_() == mime::IMAGE
    }
}

/// The result of a tool call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Observation {
    /// A plain value, already stringified.
    Plain(String),
    /// A textual result with attachments.
    Multimodal {
        /// The textual part.
        content: String,
        /// The attached units.
        attachments: Vec<Attachment>,
    },
}

impl Observation {
    /// Returns the textual content.
    #[inline]
    pub fn content(&self) -> &str {
        match self {
            Observation::Plain(content) => content,
            Observation::Multimodal { content, .. } => content,
        }
    }

    /// Returns the attachments, empty for plain values.
    #[inline]
    pub fn attachments(&self) -> &[Attachment] {
        match self {
            Observation::Plain(_) => &[],
            Observation::Multimodal { attachments, .. } => attachments,
        }
    }
}

impl From<String> for Observation {
    #[inline]
    fn from(value: String) -> Self {
        Observation::Plain(value)
    }
}

impl From<&str> for Observation {
    #[inline]
    fn from(value: &str) -> Self {
        Observation::Plain(value.to_owned())
    }
}

impl From<Value> for Observation {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Observation::Plain(s),
            Value::Null => Observation::Plain(String::new()),
            other => Observation::Plain(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_data_url() {
        let attachment = Attachment::new(mime::IMAGE_PNG, &b"png"[..]);
        assert!(attachment.is_image());
        assert_eq!(attachment.to_data_url(), "data:image/png;base64,cG5n");
    }

    #[test]
    fn test_stringify_values() {
        assert_eq!(Observation::from(json!("done")).content(), "done");
        assert_eq!(Observation::from(json!(42)).content(), "42");
        assert_eq!(
            Observation::from(json!({ "ok": true })).content(),
            r#"{"ok":true}"#
        );
        assert!(Observation::from("text").attachments().is_empty());
    }
}
