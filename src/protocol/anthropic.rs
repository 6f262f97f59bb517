use serde::Serialize;
use serde_json::Value;

use crate::error::ZenError;
use crate::protocol::mapping::{
    effort_to_budget, lift_system_messages, merge_extra, parse_arguments, required_tool_name,
};
use crate::protocol::normalized::{NormalizedRequest, Role, ToolChoiceType};

const MIN_THINKING_MAX_TOKENS: u64 = 1024;

/// Anthropic Messages request wire type.
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    system: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<AnthropicToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<AnthropicThinking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    /// A plain string or an array of content blocks.
    content: Value,
}

#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_schema: Option<Value>,
}

#[derive(Debug, Serialize)]
struct AnthropicToolChoice {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicThinking {
    #[serde(rename = "type")]
    kind: &'static str,
    budget_tokens: u32,
}

/// Encode a normalized request into the Anthropic Messages dialect body.
///
/// System and developer messages are never emitted as messages: they are
/// concatenated into the system string. A `tool_choice` of `none` omits both
/// `tools` and `tool_choice`. When a thinking budget B is in effect the
/// emitted `max_tokens` is kept strictly greater than B.
///
/// # Errors
///
/// Returns [`ZenError::InvalidToolChoice`] for a forced tool choice without
/// a name and [`ZenError::InvalidRequest`] for a tool-role message without a
/// call id.
pub fn encode_messages_request(req: &NormalizedRequest) -> Result<Value, ZenError> {
    let (system, remaining) = lift_system_messages(&req.system, &req.messages, true);

    let mut messages = Vec::with_capacity(remaining.len());
    for message in remaining {
        match message.role {
            Role::Assistant if !message.tool_calls.is_empty() => {
                let mut blocks = Vec::with_capacity(message.tool_calls.len() + 1);
                if !message.content.is_empty() {
                    blocks.push(serde_json::json!({
                        "type": "text",
                        "text": message.content,
                    }));
                }
                for call in &message.tool_calls {
                    blocks.push(serde_json::json!({
                        "type": "tool_use",
                        "id": call.id,
                        "name": call.name,
                        "input": parse_arguments(&call.arguments),
                    }));
                }
                messages.push(AnthropicMessage {
                    role: "assistant",
                    content: Value::Array(blocks),
                });
            }
            Role::Tool => {
                let call_id = message
                    .tool_call_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| {
                        ZenError::InvalidRequest(
                            "tool message requires a tool_call_id".to_string(),
                        )
                    })?;
                // Tool results ride on user messages in this dialect.
                messages.push(AnthropicMessage {
                    role: "user",
                    content: serde_json::json!([{
                        "type": "tool_result",
                        "tool_use_id": call_id,
                        "content": message.content,
                    }]),
                });
            }
            _ => {
                messages.push(AnthropicMessage {
                    role: message.role.as_str(),
                    content: Value::String(message.content.clone()),
                });
            }
        }
    }

    let budget = req.reasoning.as_ref().and_then(|r| {
        r.budget_tokens
            .filter(|b| *b > 0)
            .or_else(|| effort_to_budget(&r.effort))
    });

    let thinking = budget.map(|budget_tokens| AnthropicThinking {
        kind: "enabled",
        budget_tokens,
    });

    let max_tokens = match budget {
        Some(budget) => {
            let floor = MIN_THINKING_MAX_TOKENS.max(2 * u64::from(budget));
            match req.max_tokens {
                Some(mt) if mt > u64::from(budget) => Some(mt),
                _ => Some(floor),
            }
        }
        None => req.max_tokens,
    };

    let suppress_tools = matches!(
        &req.tool_choice,
        Some(choice) if choice.choice == ToolChoiceType::None
    );

    let tools = if suppress_tools {
        Vec::new()
    } else {
        req.tools
            .iter()
            .map(|tool| AnthropicTool {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.parameters.clone(),
            })
            .collect()
    };

    let tool_choice = match &req.tool_choice {
        Some(choice) if !suppress_tools => Some(match choice.choice {
            ToolChoiceType::Auto => AnthropicToolChoice {
                kind: "auto",
                name: None,
            },
            ToolChoiceType::Required => AnthropicToolChoice {
                kind: "any",
                name: None,
            },
            ToolChoiceType::Tool => AnthropicToolChoice {
                kind: "tool",
                name: Some(required_tool_name(choice)?.to_string()),
            },
            ToolChoiceType::None => unreachable!("none suppresses tools above"),
        }),
        _ => None,
    };

    let body = MessagesRequest {
        model: req.model.clone(),
        system,
        messages,
        tools,
        tool_choice,
        thinking,
        temperature: req.temperature,
        max_tokens,
        stream: req.stream,
    };

    let value = serde_json::to_value(&body)
        .map_err(|e| ZenError::InvalidRequest(format!("failed to encode request: {e}")))?;
    Ok(merge_extra(value, &req.extra))
}
