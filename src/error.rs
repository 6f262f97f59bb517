use http::HeaderMap;

/// Error type used across all modules.
#[derive(Debug, thiserror::Error)]
pub enum ZenError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid tool choice: {0}")]
    InvalidToolChoice(String),
    #[error("Missing function name for tool result with call id {0:?}")]
    MissingFunctionName(String),
    #[error("Gemini returned no non-empty events")]
    EmptyResponse,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Stream protocol error: {0}")]
    StreamProtocol(String),
}

impl ZenError {
    /// Whether the error may be resolved by retrying the request.
    ///
    /// Transport errors are retryable whenever attempts remain; API errors
    /// only for the gateway's transient status codes. Everything else is a
    /// caller bug and never retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ZenError::Transport(_) => true,
            ZenError::Api(api) => crate::transport::retry_policy::is_retryable_status(
                api.status_code,
            ),
            _ => false,
        }
    }
}

/// A non-2xx response from the gateway.
///
/// Carries the HTTP status, the request id when the gateway supplied one,
/// a best-effort extracted error message, and the raw response body.
#[derive(Debug)]
pub struct ApiError {
    pub status_code: u16,
    pub request_id: Option<String>,
    pub message: Option<String>,
    pub body: bytes::Bytes,
}

impl std::error::Error for ApiError {}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(
                f,
                "request failed with status {}: {message}",
                self.status_code
            ),
            None => write!(f, "request failed with status {}", self.status_code),
        }
    }
}

/// Error envelope shapes recognized in gateway error bodies:
/// `{"error":{"message":"…"}}` or a top-level `{"message":"…"}`.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorEnvelope {
    #[serde(default)]
    error: Option<ApiErrorInner>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorInner {
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Build an [`ApiError`] from a non-2xx response.
    ///
    /// The request id is read from `x-request-id` or `request-id` (first
    /// wins); the message is decoded best-effort from the error envelope.
    #[must_use]
    pub fn from_response(status: u16, headers: &HeaderMap, body: bytes::Bytes) -> Self {
        let request_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("request-id"))
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        let message = serde_json::from_slice::<ApiErrorEnvelope>(&body)
            .ok()
            .and_then(|env| {
                env.error
                    .and_then(|inner| inner.message)
                    .filter(|m| !m.is_empty())
                    .or(env.message.filter(|m| !m.is_empty()))
            });

        Self {
            status_code: status,
            request_id,
            message,
            body,
        }
    }
}
