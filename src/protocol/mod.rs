pub mod anthropic;
pub mod gemini;
pub mod mapping;
pub mod normalized;
pub mod openai_chat;
pub mod openai_responses;

use crate::error::ZenError;
use crate::routing::Endpoint;

use self::normalized::NormalizedRequest;

/// Translate a normalized request into the body for the given dialect.
///
/// # Errors
///
/// Returns [`ZenError::InvalidToolChoice`], [`ZenError::MissingFunctionName`]
/// or [`ZenError::InvalidRequest`] when the request cannot be expressed in
/// the dialect.
pub fn encode_request(
    endpoint: Endpoint,
    req: &NormalizedRequest,
) -> Result<serde_json::Value, ZenError> {
    match endpoint {
        Endpoint::Responses => openai_responses::encode_responses_request(req),
        Endpoint::ChatCompletions => openai_chat::encode_chat_completions_request(req),
        Endpoint::Messages => anthropic::encode_messages_request(req),
        Endpoint::Models => gemini::encode_gemini_request(req),
    }
}
