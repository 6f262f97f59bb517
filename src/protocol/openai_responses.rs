use serde::Serialize;
use serde_json::Value;

use crate::error::ZenError;
use crate::protocol::mapping::{lift_system_messages, merge_extra, openai_tool_choice};
use crate::protocol::normalized::{NormalizedRequest, Role};

/// OpenAI Responses request wire type. The `input` array mixes message items
/// with function-call history items.
#[derive(Debug, Serialize)]
struct ResponsesRequest {
    model: String,
    input: Value,
    #[serde(skip_serializing_if = "String::is_empty")]
    instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<ResponsesReasoning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ResponsesTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ResponsesReasoning {
    effort: String,
}

/// Function tools use the Responses flat format: `{"type":"function",
/// "name":…, "parameters":…}` rather than Chat Completions' nested one.
#[derive(Debug, Serialize)]
struct ResponsesTool {
    #[serde(rename = "type")]
    kind: &'static str,
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponsesInputItem {
    Message { role: &'static str, content: String },
    FunctionCall {
        call_id: String,
        name: String,
        arguments: String,
    },
    FunctionCallOutput { call_id: String, output: String },
}

/// Encode a normalized request into the Responses dialect body.
///
/// # Errors
///
/// Returns [`ZenError::InvalidToolChoice`] for a forced tool choice without
/// a name and [`ZenError::InvalidRequest`] for a tool-role message without a
/// call id.
pub fn encode_responses_request(req: &NormalizedRequest) -> Result<Value, ZenError> {
    let (instructions, messages) = lift_system_messages(&req.system, &req.messages, false);

    let input = if messages.is_empty() {
        Value::String(String::new())
    } else {
        let mut items = Vec::with_capacity(messages.len());
        for message in messages {
            match message.role {
                Role::Assistant if !message.tool_calls.is_empty() => {
                    // Text alongside tool calls goes out as its own message
                    // item ahead of the function_call items.
                    if !message.content.is_empty() {
                        items.push(ResponsesInputItem::Message {
                            role: message.role.as_str(),
                            content: message.content.clone(),
                        });
                    }
                    for call in &message.tool_calls {
                        items.push(ResponsesInputItem::FunctionCall {
                            call_id: call.id.clone(),
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        });
                    }
                }
                Role::Tool => {
                    let call_id = tool_call_id(message)?;
                    items.push(ResponsesInputItem::FunctionCallOutput {
                        call_id: call_id.to_string(),
                        output: message.content.clone(),
                    });
                }
                _ => {
                    items.push(ResponsesInputItem::Message {
                        role: message.role.as_str(),
                        content: message.content.clone(),
                    });
                }
            }
        }
        serde_json::to_value(items)
            .map_err(|e| ZenError::InvalidRequest(format!("failed to encode input: {e}")))?
    };

    let reasoning = req
        .reasoning
        .as_ref()
        .filter(|r| !r.effort.is_empty())
        .map(|r| ResponsesReasoning {
            effort: r.effort.clone(),
        });

    let tools = req
        .tools
        .iter()
        .map(|tool| ResponsesTool {
            kind: "function",
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        })
        .collect();

    let tool_choice = match &req.tool_choice {
        Some(choice) => Some(openai_tool_choice(choice)?),
        None => None,
    };

    let body = ResponsesRequest {
        model: req.model.clone(),
        input,
        instructions,
        reasoning,
        tools,
        tool_choice,
        temperature: req.temperature,
        max_output_tokens: req.max_tokens,
        stream: req.stream,
    };

    let value = serde_json::to_value(&body)
        .map_err(|e| ZenError::InvalidRequest(format!("failed to encode request: {e}")))?;
    Ok(merge_extra(value, &req.extra))
}

fn tool_call_id(message: &crate::protocol::normalized::NormalizedMessage) -> Result<&str, ZenError> {
    message
        .tool_call_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ZenError::InvalidRequest("tool message requires a tool_call_id".to_string())
        })
}
