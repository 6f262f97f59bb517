use serde::{Deserialize, Serialize};

use crate::routing::Endpoint;

/// Message role in the normalized conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Developer,
    User,
    Assistant,
    Tool,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Developer => "developer",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A tool call recorded on a prior assistant turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON argument text, passed through opaque.
    pub arguments: String,
}

/// One message in the normalized conversation.
///
/// A `Tool`-role message must carry a non-empty `tool_call_id` referencing a
/// prior assistant tool call; `function_name` additionally names the called
/// function for dialects that key tool results by name.
#[derive(Debug, Clone, Default)]
pub struct NormalizedMessage {
    pub role: Role,
    pub content: String,
    /// Tool calls made by an assistant turn.
    pub tool_calls: Vec<NormalizedToolCall>,
    /// On a tool message: the id of the call this result answers.
    pub tool_call_id: Option<String>,
    /// On a tool message: the called function's name, for dialects that
    /// require it (Gemini). Derived from `tool_call_id` when absent.
    pub function_name: Option<String>,
}

impl NormalizedMessage {
    /// A plain text message.
    #[must_use]
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            ..Self::default()
        }
    }

    /// A tool-result message answering the given call id.
    #[must_use]
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            ..Self::default()
        }
    }
}

/// A tool definition. `parameters` is an opaque JSON schema.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTool {
    pub name: String,
    pub description: String,
    pub parameters: Option<serde_json::Value>,
}

/// How the model may use tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolChoiceType {
    #[default]
    Auto,
    None,
    Required,
    /// Force one specific tool; `NormalizedToolChoice::name` is required.
    Tool,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedToolChoice {
    pub choice: ToolChoiceType,
    pub name: Option<String>,
}

/// Reasoning controls. `effort` is one of `low`/`medium`/`high`;
/// `budget_tokens` overrides the effort-derived Anthropic thinking budget.
#[derive(Debug, Clone, Default)]
pub struct NormalizedReasoning {
    pub effort: String,
    pub budget_tokens: Option<u32>,
}

/// The canonical request shape. `model` drives dialect routing unless
/// `endpoint` overrides it; `extra` is shallow-merged into the outgoing body
/// with base fields winning.
#[derive(Debug, Clone, Default)]
pub struct NormalizedRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<NormalizedMessage>,
    pub tools: Vec<NormalizedTool>,
    pub tool_choice: Option<NormalizedToolChoice>,
    pub reasoning: Option<NormalizedReasoning>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
    pub stream: bool,
    pub endpoint: Option<Endpoint>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}
