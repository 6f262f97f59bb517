use serde_json::{json, Map, Value};

use crate::error::ZenError;
use crate::protocol::normalized::{
    NormalizedMessage, NormalizedToolChoice, Role, ToolChoiceType,
};

/// Anthropic thinking budget for a reasoning effort label.
#[must_use]
pub fn effort_to_budget(effort: &str) -> Option<u32> {
    match effort.trim().to_ascii_lowercase().as_str() {
        "low" => Some(1024),
        "medium" => Some(2048),
        "high" => Some(4096),
        _ => None,
    }
}

/// Gemini thinking level for a reasoning effort label.
#[must_use]
pub fn effort_to_thinking_level(effort: &str) -> Option<&'static str> {
    match effort.trim().to_ascii_lowercase().as_str() {
        "low" => Some("LOW"),
        "medium" => Some("MEDIUM"),
        "high" => Some("HIGH"),
        _ => None,
    }
}

/// Tool-choice value shared by the Responses and Chat Completions dialects.
///
/// # Errors
///
/// Returns [`ZenError::InvalidToolChoice`] for `Tool` without a name.
pub fn openai_tool_choice(choice: &NormalizedToolChoice) -> Result<Value, ZenError> {
    match choice.choice {
        ToolChoiceType::Auto => Ok(json!("auto")),
        ToolChoiceType::None => Ok(json!("none")),
        ToolChoiceType::Required => Ok(json!("required")),
        ToolChoiceType::Tool => {
            let name = required_tool_name(choice)?;
            Ok(json!({"type": "function", "function": {"name": name}}))
        }
    }
}

/// The forced tool's name, validated non-empty.
///
/// # Errors
///
/// Returns [`ZenError::InvalidToolChoice`] when the name is missing or blank.
pub fn required_tool_name(choice: &NormalizedToolChoice) -> Result<&str, ZenError> {
    choice
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ZenError::InvalidToolChoice("tool choice name is required".to_string()))
}

/// Lift system instructions out of the message list.
///
/// Returns the combined system text (the request-level `system` joined with
/// each lifted message's content by a blank line) and the messages that
/// remain. `Developer` messages are lifted only when `lift_developer` is set
/// (the Anthropic dialect has no developer role).
#[must_use]
pub fn lift_system_messages<'a>(
    system: &str,
    messages: &'a [NormalizedMessage],
    lift_developer: bool,
) -> (String, Vec<&'a NormalizedMessage>) {
    let mut combined = system.trim().to_string();
    let mut remaining = Vec::with_capacity(messages.len());

    for message in messages {
        let lift = message.role == Role::System || (lift_developer && message.role == Role::Developer);
        if lift {
            let content = message.content.trim();
            if !content.is_empty() {
                if !combined.is_empty() {
                    combined.push_str("\n\n");
                }
                combined.push_str(content);
            }
            continue;
        }
        remaining.push(message);
    }

    (combined, remaining)
}

/// Merge `extra` into a serialized body object. Base fields always win over
/// same-named extra keys; the merge is shallow.
#[must_use]
pub fn merge_extra(mut body: Value, extra: &Map<String, Value>) -> Value {
    if extra.is_empty() {
        return body;
    }
    if let Value::Object(base) = &mut body {
        for (key, value) in extra {
            if !base.contains_key(key) {
                base.insert(key.clone(), value.clone());
            }
        }
    }
    body
}

/// Parse opaque tool-call argument text into a JSON value, falling back to
/// an empty object for text that is not valid JSON.
#[must_use]
pub fn parse_arguments(arguments: &str) -> Value {
    serde_json::from_str(arguments).unwrap_or_else(|_| json!({}))
}
