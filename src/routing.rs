use crate::error::ZenError;

/// Which upstream dialect a request targets. One value per gateway wire
/// format; resolved once per request and carried alongside every stream
/// event so the delta parser can dispatch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Responses,
    ChatCompletions,
    Messages,
    Models,
}

const OPENCODE_PREFIX: &str = "opencode/";

/// Strip a case-insensitive `opencode/` prefix, preserving the remainder's
/// original casing.
#[must_use]
pub fn strip_opencode_prefix(model: &str) -> &str {
    let trimmed = model.trim();
    if trimmed
        .get(..OPENCODE_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(OPENCODE_PREFIX))
    {
        &trimmed[OPENCODE_PREFIX.len()..]
    } else {
        trimmed
    }
}

/// Canonical routing key for a model id: prefix-stripped and lowercased.
#[must_use]
pub fn normalize_model_id(model: &str) -> String {
    strip_opencode_prefix(model).to_ascii_lowercase()
}

/// Map a model id to its dialect.
///
/// `gpt-*` → Responses, `claude-*` → Messages, `gemini-*` → Models,
/// anything else → Chat Completions.
#[must_use]
pub fn route_for_model(model: &str) -> Endpoint {
    let m = normalize_model_id(model);
    if m.starts_with("gpt-") {
        Endpoint::Responses
    } else if m.starts_with("claude-") {
        Endpoint::Messages
    } else if m.starts_with("gemini-") {
        Endpoint::Models
    } else {
        Endpoint::ChatCompletions
    }
}

/// Resolve the URL path for an endpoint.
///
/// The Models (Gemini) dialect always uses the streaming URL, including for
/// blocking calls; see [`crate::Client::create`] for the reconstruction of a
/// synchronous response from the event stream.
///
/// # Errors
///
/// Returns [`ZenError::InvalidRequest`] when the Models dialect is requested
/// with an empty model id (the model is a path segment there).
pub fn resolve_path(endpoint: Endpoint, model: &str) -> Result<String, ZenError> {
    match endpoint {
        Endpoint::Responses => Ok("/responses".to_string()),
        Endpoint::Messages => Ok("/messages".to_string()),
        Endpoint::ChatCompletions => Ok("/chat/completions".to_string()),
        Endpoint::Models => {
            let model = strip_opencode_prefix(model);
            if model.is_empty() {
                return Err(ZenError::InvalidRequest(
                    "model is required for the models endpoint".to_string(),
                ));
            }
            Ok(format!("/models/{model}:streamGenerateContent?alt=sse"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_table() {
        assert_eq!(route_for_model("gpt-5.2-codex"), Endpoint::Responses);
        assert_eq!(route_for_model("claude-sonnet-4-6"), Endpoint::Messages);
        assert_eq!(route_for_model("gemini-3-pro"), Endpoint::Models);
        assert_eq!(route_for_model("glm-5"), Endpoint::ChatCompletions);
        assert_eq!(route_for_model("kimi-k2"), Endpoint::ChatCompletions);
    }

    #[test]
    fn test_routing_strips_opencode_prefix_case_insensitively() {
        assert_eq!(route_for_model("opencode/gpt-5.2"), Endpoint::Responses);
        assert_eq!(route_for_model("OpenCode/Claude-Sonnet-4-6"), Endpoint::Messages);
        assert_eq!(route_for_model("OPENCODE/gemini-3-flash"), Endpoint::Models);
    }

    #[test]
    fn test_prefix_strip_preserves_case() {
        assert_eq!(strip_opencode_prefix("OpenCode/Gemini-3-Pro"), "Gemini-3-Pro");
        assert_eq!(strip_opencode_prefix("  gpt-5.2  "), "gpt-5.2");
        assert_eq!(strip_opencode_prefix("opencodex/gpt"), "opencodex/gpt");
    }

    // Stripping the prefix and lowercasing commute: applying them in either
    // order yields the same routing decision.
    #[test]
    fn test_normalize_order_independent() {
        for model in [
            "OPENCODE/GPT-5.2",
            "opencode/Claude-Sonnet-4-6",
            "Gemini-3-Pro",
            "opencode/GLM-5",
            "opencode/opencode/gpt-5.2",
        ] {
            let strip_then_lower = strip_opencode_prefix(model).to_ascii_lowercase();
            let lower_then_strip =
                strip_opencode_prefix(&model.to_ascii_lowercase()).to_string();
            assert_eq!(
                route_for_model(&strip_then_lower),
                route_for_model(&lower_then_strip),
                "routing diverged for {model}"
            );
        }
    }

    #[test]
    fn test_resolve_paths() {
        assert_eq!(
            resolve_path(Endpoint::Responses, "gpt-5.2").unwrap(),
            "/responses"
        );
        assert_eq!(
            resolve_path(Endpoint::Messages, "claude-sonnet-4-6").unwrap(),
            "/messages"
        );
        assert_eq!(
            resolve_path(Endpoint::ChatCompletions, "glm-5").unwrap(),
            "/chat/completions"
        );
        assert_eq!(
            resolve_path(Endpoint::Models, "gemini-3-pro").unwrap(),
            "/models/gemini-3-pro:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn test_models_path_requires_model() {
        let err = resolve_path(Endpoint::Models, "   ").unwrap_err();
        assert!(matches!(err, ZenError::InvalidRequest(_)));
    }

    #[test]
    fn test_models_path_strips_prefix_only() {
        // The path segment keeps the caller's casing; only the prefix goes.
        assert_eq!(
            resolve_path(Endpoint::Models, "opencode/Gemini-3-Pro").unwrap(),
            "/models/Gemini-3-Pro:streamGenerateContent?alt=sse"
        );
    }
}
