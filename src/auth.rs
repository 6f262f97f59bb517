use http::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::HeaderMap;

use crate::config::{AuthHeader, Config};
use crate::routing::Endpoint;

const X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");
const X_GOOG_API_KEY: HeaderName = HeaderName::from_static("x-goog-api-key");
const ANTHROPIC_VERSION: HeaderName = HeaderName::from_static("anthropic-version");
const ANTHROPIC_BETA: HeaderName = HeaderName::from_static("anthropic-beta");

const ANTHROPIC_VERSION_VALUE: &str = "2023-06-01";
const ANTHROPIC_STREAMING_BETA: &str = "fine-grained-tool-streaming-2025-05-14";

/// Build the full header set for one outgoing request.
///
/// Both the blocking and the streaming transport paths go through this one
/// function; the auth header chosen for a dialect must never depend on which
/// path opened the request.
#[must_use]
pub fn request_headers(
    config: &Config,
    endpoint: Endpoint,
    has_body: bool,
    streaming: bool,
    force_all_auth: bool,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if has_body {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    if streaming {
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    }

    apply_auth_headers(config, &mut headers, endpoint, force_all_auth);

    if endpoint == Endpoint::Messages {
        headers.insert(
            ANTHROPIC_VERSION,
            HeaderValue::from_static(ANTHROPIC_VERSION_VALUE),
        );
        if streaming {
            headers.insert(
                ANTHROPIC_BETA,
                HeaderValue::from_static(ANTHROPIC_STREAMING_BETA),
            );
        }
    }

    if let Ok(value) = HeaderValue::from_str(&config.user_agent) {
        headers.insert(USER_AGENT, value);
    }

    headers
}

fn apply_auth_headers(
    config: &Config,
    headers: &mut HeaderMap,
    endpoint: Endpoint,
    force_all: bool,
) {
    if force_all {
        set_bearer(headers, &config.api_key);
        set_key_header(headers, X_API_KEY, &config.api_key);
        set_key_header(headers, X_GOOG_API_KEY, &config.api_key);
        return;
    }

    match config.auth_header {
        AuthHeader::Bearer => set_bearer(headers, &config.api_key),
        AuthHeader::ApiKey => set_key_header(headers, X_API_KEY, &config.api_key),
        AuthHeader::GoogApiKey => set_key_header(headers, X_GOOG_API_KEY, &config.api_key),
        AuthHeader::Auto => match endpoint {
            Endpoint::Messages => set_key_header(headers, X_API_KEY, &config.api_key),
            Endpoint::Models => set_key_header(headers, X_GOOG_API_KEY, &config.api_key),
            Endpoint::Responses | Endpoint::ChatCompletions => {
                set_bearer(headers, &config.api_key);
            }
        },
    }
}

fn set_bearer(headers: &mut HeaderMap, key: &str) {
    let value = if key
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("bearer "))
    {
        key.to_string()
    } else {
        format!("Bearer {key}")
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(AUTHORIZATION, value);
    }
}

fn set_key_header(headers: &mut HeaderMap, name: HeaderName, key: &str) {
    if let Ok(value) = HeaderValue::from_str(key) {
        headers.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(auth_header: AuthHeader) -> Config {
        let mut cfg = Config::new("sk-zen-test");
        cfg.auth_header = auth_header;
        cfg.apply_defaults().unwrap();
        cfg
    }

    #[test]
    fn test_auto_mode_per_dialect() {
        let cfg = config_with(AuthHeader::Auto);

        let h = request_headers(&cfg, Endpoint::Responses, true, false, false);
        assert_eq!(h.get(AUTHORIZATION).unwrap(), "Bearer sk-zen-test");
        assert!(h.get("x-api-key").is_none());

        let h = request_headers(&cfg, Endpoint::ChatCompletions, true, false, false);
        assert_eq!(h.get(AUTHORIZATION).unwrap(), "Bearer sk-zen-test");

        let h = request_headers(&cfg, Endpoint::Messages, true, false, false);
        assert_eq!(h.get("x-api-key").unwrap(), "sk-zen-test");
        assert!(h.get(AUTHORIZATION).is_none());

        let h = request_headers(&cfg, Endpoint::Models, true, false, false);
        assert_eq!(h.get("x-goog-api-key").unwrap(), "sk-zen-test");
        assert!(h.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_explicit_modes_override_dialect() {
        let cfg = config_with(AuthHeader::GoogApiKey);
        let h = request_headers(&cfg, Endpoint::Messages, true, false, false);
        assert_eq!(h.get("x-goog-api-key").unwrap(), "sk-zen-test");
        assert!(h.get("x-api-key").is_none());
    }

    #[test]
    fn test_bearer_prefix_not_doubled() {
        let mut cfg = Config::new("Bearer sk-already-prefixed");
        cfg.apply_defaults().unwrap();
        let h = request_headers(&cfg, Endpoint::Responses, true, false, false);
        assert_eq!(h.get(AUTHORIZATION).unwrap(), "Bearer sk-already-prefixed");

        let mut cfg = Config::new("bearer sk-lowercase");
        cfg.apply_defaults().unwrap();
        let h = request_headers(&cfg, Endpoint::Responses, true, false, false);
        assert_eq!(h.get(AUTHORIZATION).unwrap(), "bearer sk-lowercase");
    }

    #[test]
    fn test_force_all_sets_every_auth_header() {
        let cfg = config_with(AuthHeader::Auto);
        let h = request_headers(&cfg, Endpoint::ChatCompletions, true, false, true);
        assert_eq!(h.get(AUTHORIZATION).unwrap(), "Bearer sk-zen-test");
        assert_eq!(h.get("x-api-key").unwrap(), "sk-zen-test");
        assert_eq!(h.get("x-goog-api-key").unwrap(), "sk-zen-test");
    }

    #[test]
    fn test_anthropic_version_and_streaming_beta() {
        let cfg = config_with(AuthHeader::Auto);

        let h = request_headers(&cfg, Endpoint::Messages, true, false, false);
        assert_eq!(h.get("anthropic-version").unwrap(), ANTHROPIC_VERSION_VALUE);
        assert!(h.get("anthropic-beta").is_none());

        let h = request_headers(&cfg, Endpoint::Messages, true, true, false);
        assert_eq!(h.get("anthropic-beta").unwrap(), ANTHROPIC_STREAMING_BETA);
        assert_eq!(h.get(ACCEPT).unwrap(), "text/event-stream");
    }

    #[test]
    fn test_content_type_only_with_body() {
        let cfg = config_with(AuthHeader::Auto);
        let h = request_headers(&cfg, Endpoint::Responses, false, false, false);
        assert!(h.get(CONTENT_TYPE).is_none());
        let h = request_headers(&cfg, Endpoint::Responses, true, false, false);
        assert_eq!(h.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_user_agent_always_present() {
        let cfg = config_with(AuthHeader::Auto);
        for endpoint in [
            Endpoint::Responses,
            Endpoint::ChatCompletions,
            Endpoint::Messages,
            Endpoint::Models,
        ] {
            let h = request_headers(&cfg, endpoint, true, true, false);
            assert_eq!(h.get(USER_AGENT).unwrap(), crate::config::DEFAULT_USER_AGENT);
        }
    }
}
