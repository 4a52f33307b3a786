use serde_json::Value;

/// The reply shapes a hosted model may return, plus a catch-all.
///
/// Classification never fails: anything unrecognised lands in [`GenerationReply::Raw`],
/// and [`GenerationReply::into_text`] still produces a string for it. Callers get
/// *some* text back from any reply that parsed, at the cost of occasionally
/// surfacing raw JSON to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationReply {
    /// `{"output": {"message": {"content": [{"text": ...}]}}}`
    Output { text: String },
    /// `{"message": {"content": [{"text": ...}] | "..."}}`
    Message { text: String },
    /// `{"content": [{"text": ...}] | "..."}`
    Content { text: String },
    /// `{"completion": "..."}`
    Completion { text: String },
    Raw(Value),
}

impl GenerationReply {
    pub fn classify(value: Value) -> Self {
        if let Some(text) = value.pointer("/output/message/content").and_then(content_text) {
            return GenerationReply::Output { text };
        }
        if let Some(text) = value.pointer("/message/content").and_then(content_text) {
            return GenerationReply::Message { text };
        }
        if let Some(text) = value.get("content").and_then(content_text) {
            return GenerationReply::Content { text };
        }
        if let Some(text) = value.get("completion").and_then(Value::as_str) {
            return GenerationReply::Completion {
                text: text.to_string(),
            };
        }
        GenerationReply::Raw(value)
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, GenerationReply::Raw(_))
    }

    pub fn into_text(self) -> String {
        match self {
            GenerationReply::Output { text }
            | GenerationReply::Message { text }
            | GenerationReply::Content { text }
            | GenerationReply::Completion { text } => text,
            GenerationReply::Raw(value) => match salvage_text(&value) {
                Some(text) => text.to_string(),
                None => serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
            },
        }
    }
}

/// A content field is either a plain string or a list of parts; text parts are concatenated.
fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect();
            if texts.is_empty() {
                None
            } else {
                Some(texts.concat())
            }
        }
        _ => None,
    }
}

/// Depth-first search for the first string-valued `text` field.
fn salvage_text(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                return Some(text);
            }
            map.values().find_map(salvage_text)
        }
        Value::Array(items) => items.iter().find_map(salvage_text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_nova_output_shape() {
        let reply = GenerationReply::classify(json!({
            "output": {"message": {"role": "assistant", "content": [{"text": "- Term: 12 months"}]}},
            "stopReason": "end_turn",
            "usage": {"inputTokens": 10, "outputTokens": 5}
        }));
        assert_eq!(
            reply,
            GenerationReply::Output {
                text: "- Term: 12 months".into()
            }
        );
    }

    #[test]
    fn test_message_shape_with_list_and_string_content() {
        let listed = GenerationReply::classify(json!({
            "message": {"content": [{"text": "part one, "}, {"image": {}}, {"text": "part two"}]}
        }));
        assert_eq!(listed.into_text(), "part one, part two");

        let plain = GenerationReply::classify(json!({"message": {"content": "plain"}}));
        assert!(matches!(plain, GenerationReply::Message { .. }));
        assert_eq!(plain.into_text(), "plain");
    }

    #[test]
    fn test_content_and_completion_shapes() {
        let content = GenerationReply::classify(json!({"content": [{"type": "text", "text": "hi"}]}));
        assert!(matches!(content, GenerationReply::Content { .. }));

        let completion = GenerationReply::classify(json!({"completion": "done"}));
        assert_eq!(
            completion,
            GenerationReply::Completion {
                text: "done".into()
            }
        );
    }

    #[test]
    fn test_raw_reply_salvages_nested_text() {
        let reply = GenerationReply::classify(json!({
            "results": [{"outputText": "ignored", "detail": {"text": "salvaged"}}]
        }));
        assert!(reply.is_raw());
        assert_eq!(reply.into_text(), "salvaged");
    }

    #[test]
    fn test_raw_reply_without_text_renders_json() {
        let value = json!({"unexpected": 42});
        let reply = GenerationReply::classify(value.clone());
        assert!(reply.is_raw());
        assert_eq!(
            reply.into_text(),
            serde_json::to_string_pretty(&value).unwrap()
        );
    }

    #[test]
    fn test_empty_content_list_falls_through_to_raw() {
        let reply = GenerationReply::classify(json!({"output": {"message": {"content": []}}}));
        assert!(reply.is_raw());
    }
}
