use std::sync::Arc;
use std::time::Duration;

use crate::error::ZenError;

pub(crate) const DEFAULT_BASE_URL: &str = "https://opencode.ai/zen/v1";
pub(crate) const DEFAULT_USER_AGENT: &str = "zen-sdk-rs/0.1";

/// Which auth header carries the API key on outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthHeader {
    /// Pick per dialect: Messages → `x-api-key`, Models → `x-goog-api-key`,
    /// everything else → `Authorization: Bearer`.
    #[default]
    Auto,
    Bearer,
    ApiKey,
    GoogApiKey,
}

/// Backoff schedule: a pure function from the 0-based attempt number to the
/// sleep before the next attempt.
pub type Backoff = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// Retry behavior for non-streaming requests.
///
/// Streaming requests are never retried: a partially consumed stream is not
/// safe to replay.
#[derive(Clone)]
pub struct RetryConfig {
    /// Extra attempts after the first. 0 disables retries.
    pub max_retries: u32,
    /// Retries are forced off for non-idempotent methods (anything other
    /// than GET/HEAD/OPTIONS) unless this opt-in is set.
    pub retry_on_non_idempotent: bool,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            retry_on_non_idempotent: false,
            backoff: Arc::new(crate::transport::retry_policy::default_backoff),
        }
    }
}

impl std::fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("retry_on_non_idempotent", &self.retry_on_non_idempotent)
            .finish_non_exhaustive()
    }
}

/// Client configuration. Immutable after [`crate::Client::new`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Gateway API key. Required.
    pub api_key: String,
    /// Base URL, default `https://opencode.ai/zen/v1`. Trailing slashes are
    /// stripped.
    pub base_url: String,
    pub user_agent: String,
    pub auth_header: AuthHeader,
    pub retry: RetryConfig,
    /// Total round-trip deadline applied to the internal HTTP client.
    ///
    /// WARNING: this deadline keeps running while the response body is being
    /// read, so a non-zero value WILL kill SSE streams that outlive it.
    /// Leave it unset for streaming and bound individual calls by dropping
    /// the future (e.g. `tokio::time::timeout`) instead.
    ///
    /// Has no effect when `http_client` is supplied by the caller.
    pub timeout: Option<Duration>,
    /// Caller-supplied HTTP client. When set, `timeout` is ignored and the
    /// client must not carry its own total-deadline for the same reason as
    /// above. Must be safe to share across concurrent calls (reqwest clients
    /// are).
    pub http_client: Option<reqwest::Client>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            user_agent: String::new(),
            auth_header: AuthHeader::Auto,
            retry: RetryConfig::default(),
            timeout: None,
            http_client: None,
        }
    }
}

impl Config {
    /// Convenience constructor: a config with the given API key and defaults
    /// everywhere else.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Validate the config and fill in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ZenError::Config`] when the API key is empty.
    pub(crate) fn apply_defaults(&mut self) -> Result<(), ZenError> {
        if self.api_key.trim().is_empty() {
            return Err(ZenError::Config("API key is required".to_string()));
        }

        if self.base_url.trim().is_empty() {
            self.base_url = DEFAULT_BASE_URL.to_string();
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();

        if self.user_agent.trim().is_empty() {
            self.user_agent = DEFAULT_USER_AGENT.to_string();
        }

        Ok(())
    }
}
