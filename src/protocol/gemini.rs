use serde::Serialize;
use serde_json::Value;

use crate::error::ZenError;
use crate::protocol::mapping::{
    effort_to_thinking_level, lift_system_messages, merge_extra, parse_arguments,
    required_tool_name,
};
use crate::protocol::normalized::{NormalizedMessage, NormalizedRequest, Role, ToolChoiceType};

/// Gemini generateContent request wire type. Streaming is selected by the
/// URL (`:streamGenerateContent?alt=sse`), not a body field.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<GeminiToolConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum GeminiPart {
    #[serde(rename = "text")]
    Text(String),
    FunctionCall {
        name: String,
        args: Value,
    },
    FunctionResponse {
        name: String,
        response: Value,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<GeminiThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiThinkingConfig {
    thinking_level: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiToolConfig {
    function_calling_config: GeminiFunctionCallingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiFunctionCallingConfig {
    mode: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    allowed_function_names: Vec<String>,
}

/// Encode a normalized request into the Gemini Models dialect body.
///
/// Assistant turns map to role `model`; tool results become a `user` turn
/// carrying a `functionResponse` part whose required `name` comes from the
/// message's `function_name` or, failing that, the matching tool call on a
/// prior assistant turn.
///
/// # Errors
///
/// Returns [`ZenError::MissingFunctionName`] when a tool result's function
/// name cannot be resolved, [`ZenError::InvalidToolChoice`] for a forced
/// tool choice without a name, and [`ZenError::InvalidRequest`] for a
/// tool-role message without a call id.
pub fn encode_gemini_request(req: &NormalizedRequest) -> Result<Value, ZenError> {
    let (system, remaining) = lift_system_messages(&req.system, &req.messages, false);

    let mut contents = Vec::with_capacity(remaining.len());
    for &message in &remaining {
        match message.role {
            Role::Assistant if !message.tool_calls.is_empty() => {
                let mut parts = Vec::with_capacity(message.tool_calls.len() + 1);
                if !message.content.is_empty() {
                    parts.push(GeminiPart::Text(message.content.clone()));
                }
                for call in &message.tool_calls {
                    parts.push(GeminiPart::FunctionCall {
                        name: call.name.clone(),
                        args: parse_arguments(&call.arguments),
                    });
                }
                contents.push(GeminiContent {
                    role: "model".to_string(),
                    parts,
                });
            }
            Role::Tool => {
                let name = resolve_function_name(message, &remaining)?;
                contents.push(GeminiContent {
                    role: "user".to_string(),
                    parts: vec![GeminiPart::FunctionResponse {
                        name,
                        response: serde_json::json!({"output": message.content}),
                    }],
                });
            }
            _ => {
                let role = match message.role {
                    Role::Assistant => "model".to_string(),
                    other => other.as_str().to_string(),
                };
                contents.push(GeminiContent {
                    role,
                    parts: vec![GeminiPart::Text(message.content.clone())],
                });
            }
        }
    }

    let system_instruction = (!system.is_empty()).then(|| GeminiContent {
        role: "system".to_string(),
        parts: vec![GeminiPart::Text(system)],
    });

    let thinking_config = req
        .reasoning
        .as_ref()
        .and_then(|r| effort_to_thinking_level(&r.effort))
        .map(|thinking_level| GeminiThinkingConfig { thinking_level });

    let generation_config = if req.temperature.is_some()
        || req.max_tokens.is_some()
        || thinking_config.is_some()
    {
        Some(GeminiGenerationConfig {
            temperature: req.temperature,
            max_output_tokens: req.max_tokens,
            thinking_config,
        })
    } else {
        None
    };

    let tools = if req.tools.is_empty() {
        Vec::new()
    } else {
        vec![GeminiTool {
            function_declarations: req
                .tools
                .iter()
                .map(|tool| GeminiFunctionDeclaration {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                })
                .collect(),
        }]
    };

    let tool_config = match &req.tool_choice {
        Some(choice) => Some(GeminiToolConfig {
            function_calling_config: match choice.choice {
                ToolChoiceType::Auto => GeminiFunctionCallingConfig {
                    mode: "AUTO",
                    allowed_function_names: Vec::new(),
                },
                ToolChoiceType::None => GeminiFunctionCallingConfig {
                    mode: "NONE",
                    allowed_function_names: Vec::new(),
                },
                ToolChoiceType::Required => GeminiFunctionCallingConfig {
                    mode: "ANY",
                    allowed_function_names: Vec::new(),
                },
                ToolChoiceType::Tool => GeminiFunctionCallingConfig {
                    mode: "ANY",
                    allowed_function_names: vec![required_tool_name(choice)?.to_string()],
                },
            },
        }),
        None => None,
    };

    let body = GeminiRequest {
        contents,
        system_instruction,
        generation_config,
        tools,
        tool_config,
    };

    let value = serde_json::to_value(&body)
        .map_err(|e| ZenError::InvalidRequest(format!("failed to encode request: {e}")))?;
    Ok(merge_extra(value, &req.extra))
}

/// The function name for a tool-result message: explicit `function_name`
/// first, then a lookup of `tool_call_id` against prior assistant tool
/// calls.
fn resolve_function_name(
    message: &NormalizedMessage,
    history: &[&NormalizedMessage],
) -> Result<String, ZenError> {
    if let Some(name) = message.function_name.as_deref().filter(|n| !n.is_empty()) {
        return Ok(name.to_string());
    }

    let call_id = message
        .tool_call_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ZenError::InvalidRequest("tool message requires a tool_call_id".to_string())
        })?;

    for prior in history {
        if prior.role != Role::Assistant {
            continue;
        }
        for call in &prior.tool_calls {
            if call.id == call_id && !call.name.is_empty() {
                return Ok(call.name.clone());
            }
        }
    }

    Err(ZenError::MissingFunctionName(call_id.to_string()))
}
