use serde::Serialize;
use serde_json::Value;

use crate::error::ZenError;
use crate::protocol::mapping::{lift_system_messages, merge_extra, openai_tool_choice};
use crate::protocol::normalized::{NormalizedRequest, Role};

/// Chat Completions request wire type.
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<ChatReasoning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ChatToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    function: ChatFunctionCall,
}

#[derive(Debug, Serialize)]
struct ChatFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ChatReasoning {
    effort: String,
}

#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ChatToolFunction,
}

#[derive(Debug, Serialize)]
struct ChatToolFunction {
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

/// Encode a normalized request into the Chat Completions dialect body.
///
/// # Errors
///
/// Returns [`ZenError::InvalidToolChoice`] for a forced tool choice without
/// a name and [`ZenError::InvalidRequest`] for a tool-role message without a
/// call id.
pub fn encode_chat_completions_request(req: &NormalizedRequest) -> Result<Value, ZenError> {
    let (system, remaining) = lift_system_messages(&req.system, &req.messages, false);

    let mut messages = Vec::with_capacity(remaining.len() + 1);
    if !system.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: system,
            tool_calls: Vec::new(),
            tool_call_id: None,
        });
    }

    for message in remaining {
        let tool_call_id = match message.role {
            Role::Tool => {
                let id = message
                    .tool_call_id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| {
                        ZenError::InvalidRequest(
                            "tool message requires a tool_call_id".to_string(),
                        )
                    })?;
                Some(id.to_string())
            }
            _ => None,
        };

        messages.push(ChatMessage {
            role: message.role.as_str(),
            content: message.content.clone(),
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| ChatToolCall {
                    id: call.id.clone(),
                    kind: "function",
                    function: ChatFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect(),
            tool_call_id,
        });
    }

    let reasoning = req
        .reasoning
        .as_ref()
        .filter(|r| !r.effort.is_empty())
        .map(|r| ChatReasoning {
            effort: r.effort.clone(),
        });

    let tools = req
        .tools
        .iter()
        .map(|tool| ChatTool {
            kind: "function",
            function: ChatToolFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        })
        .collect();

    let tool_choice = match &req.tool_choice {
        Some(choice) => Some(openai_tool_choice(choice)?),
        None => None,
    };

    let body = ChatCompletionsRequest {
        model: req.model.clone(),
        messages,
        reasoning,
        tools,
        tool_choice,
        temperature: req.temperature,
        max_tokens: req.max_tokens,
        stream: req.stream,
    };

    let value = serde_json::to_value(&body)
        .map_err(|e| ZenError::InvalidRequest(format!("failed to encode request: {e}")))?;
    Ok(merge_extra(value, &req.extra))
}
