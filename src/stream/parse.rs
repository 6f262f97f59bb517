use serde::Deserialize;

use super::UnifiedEvent;
use crate::routing::Endpoint;

/// One parsed streaming increment, dialect-agnostic.
///
/// A single wire event can yield several deltas (a Gemini chunk may carry a
/// thought part, a text part, and a finish reason at once); the parser emits
/// them in the order the event lists them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedDelta {
    /// A fragment of the assistant's visible reply.
    Text(String),
    /// A fragment of the model's reasoning output.
    Reasoning(String),
    /// Start of a tool call. `id` and `name` may still be empty for dialects
    /// that deliver them later; the accumulator fills the gaps.
    ToolCallBegin {
        index: usize,
        id: String,
        name: String,
        signature: Option<String>,
    },
    /// An incremental JSON fragment of a tool call's arguments.
    ToolCallArgumentsDelta { index: usize, delta: String },
    /// A tool call is complete; `arguments_full` is the fully accumulated
    /// argument text as the provider reported it.
    ToolCallDone {
        index: usize,
        id: String,
        name: String,
        signature: Option<String>,
        arguments_full: String,
    },
    /// The stream has finished.
    Done,
}

/// Parse a single unified event into zero or more normalized deltas.
///
/// Events with invalid JSON or no recognized fields yield an empty vec:
/// SSE streams are expected to carry heartbeats and experimental event types
/// the parser does not know.
#[must_use]
pub fn parse_normalized_event(ev: &UnifiedEvent) -> Vec<NormalizedDelta> {
    if ev.data.is_empty() {
        return Vec::new();
    }

    match ev.endpoint {
        Endpoint::ChatCompletions => parse_chat_completions_delta(&ev.data),
        Endpoint::Responses => parse_responses_delta(&ev.data),
        Endpoint::Messages => parse_messages_delta(&ev.data, &ev.event),
        Endpoint::Models => parse_gemini_delta(&ev.data),
    }
}

// ---------------------------------------------------------------------------
// chat/completions
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    delta: ChatDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    reasoning_details: Vec<ChatReasoningDetail>,
    #[serde(default)]
    tool_calls: Vec<ChatToolCallDelta>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatReasoningDetail {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatToolCallDelta {
    #[serde(default)]
    index: usize,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: ChatFunctionDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChatFunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

fn parse_chat_completions_delta(data: &str) -> Vec<NormalizedDelta> {
    let Ok(chunk) = serde_json::from_str::<ChatChunk>(data) else {
        return Vec::new();
    };
    let Some(choice) = chunk.choices.into_iter().next() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let delta = choice.delta;

    if let Some(reasoning) = delta.reasoning_content.filter(|s| !s.is_empty()) {
        out.push(NormalizedDelta::Reasoning(reasoning));
    }
    if let Some(reasoning) = delta.reasoning.filter(|s| !s.is_empty()) {
        out.push(NormalizedDelta::Reasoning(reasoning));
    }
    for detail in delta.reasoning_details {
        if let Some(text) = detail.text.filter(|s| !s.is_empty()) {
            out.push(NormalizedDelta::Reasoning(text));
        }
    }
    if let Some(content) = delta.content.filter(|s| !s.is_empty()) {
        out.push(NormalizedDelta::Text(content));
    }
    for tc in delta.tool_calls {
        let id = tc.id.unwrap_or_default();
        let name = tc.function.name.unwrap_or_default();
        if !id.is_empty() || !name.is_empty() {
            out.push(NormalizedDelta::ToolCallBegin {
                index: tc.index,
                id,
                name,
                signature: None,
            });
        }
        if let Some(arguments) = tc.function.arguments.filter(|s| !s.is_empty()) {
            out.push(NormalizedDelta::ToolCallArgumentsDelta {
                index: tc.index,
                delta: arguments,
            });
        }
    }
    if choice.finish_reason.filter(|s| !s.is_empty()).is_some() {
        out.push(NormalizedDelta::Done);
    }

    out
}

// ---------------------------------------------------------------------------
// responses (OpenAI Responses API)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ResponsesEvent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    delta: Option<String>,
    #[serde(default)]
    item: Option<ResponsesItem>,
    #[serde(default)]
    output_index: usize,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    call_id: Option<String>,
    #[serde(default)]
    item_id: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsesItem {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    call_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tool_name: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn parse_responses_delta(data: &str) -> Vec<NormalizedDelta> {
    let Ok(e) = serde_json::from_str::<ResponsesEvent>(data) else {
        return Vec::new();
    };

    match e.kind.as_str() {
        "response.output_text.delta" => {
            if let Some(delta) = non_empty(e.delta) {
                return vec![NormalizedDelta::Text(delta)];
            }
        }
        "response.reasoning_summary_text.delta"
        | "response.reasoning.delta"
        | "response.reasoning_text.delta" => {
            if let Some(delta) = non_empty(e.delta) {
                return vec![NormalizedDelta::Reasoning(delta)];
            }
        }
        "response.function_call_arguments_delta" | "response.function_call_arguments.delta" => {
            if let Some(delta) = non_empty(e.delta) {
                return vec![NormalizedDelta::ToolCallArgumentsDelta {
                    index: e.output_index,
                    delta,
                }];
            }
        }
        "response.function_call_arguments_done" | "response.function_call_arguments.done" => {
            let id = non_empty(e.call_id)
                .or_else(|| non_empty(e.item_id))
                .unwrap_or_default();
            return vec![NormalizedDelta::ToolCallDone {
                index: e.output_index,
                id,
                name: e.name.unwrap_or_default(),
                signature: None,
                arguments_full: e.arguments.unwrap_or_default(),
            }];
        }
        "response.output_item.added" => {
            if let Some(item) = e.item {
                if item.kind == "function_call" {
                    // Providers disagree on where the id lives: prefer the
                    // item's call_id, then its plain id.
                    let id = non_empty(item.call_id)
                        .or_else(|| non_empty(item.id))
                        .unwrap_or_default();
                    let name = non_empty(item.name)
                        .or_else(|| non_empty(item.tool_name))
                        .or_else(|| non_empty(e.name))
                        .unwrap_or_default();
                    return vec![NormalizedDelta::ToolCallBegin {
                        index: e.output_index,
                        id,
                        name,
                        signature: None,
                    }];
                }
            }
        }
        "response.completed" | "response.done" => {
            return vec![NormalizedDelta::Done];
        }
        _ => {}
    }

    Vec::new()
}

// ---------------------------------------------------------------------------
// messages (Anthropic)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct AnthropicEvent {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    index: usize,
    #[serde(default)]
    delta: AnthropicDelta,
    #[serde(default)]
    content_block: AnthropicContentBlock,
}

#[derive(Debug, Default, Deserialize)]
struct AnthropicDelta {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thinking: Option<String>,
    #[serde(default)]
    partial_json: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
}

fn parse_messages_delta(data: &str, sse_event: &str) -> Vec<NormalizedDelta> {
    let Ok(e) = serde_json::from_str::<AnthropicEvent>(data) else {
        return Vec::new();
    };

    // Anthropic duplicates the event name in the JSON body's "type" field;
    // prefer the body, fall back to the SSE event line.
    let kind = e.kind.as_deref().filter(|k| !k.is_empty()).unwrap_or(sse_event);

    match kind {
        "content_block_start" => {
            if e.content_block.kind == "tool_use" {
                return vec![NormalizedDelta::ToolCallBegin {
                    index: e.index,
                    id: e.content_block.id,
                    name: e.content_block.name,
                    signature: None,
                }];
            }
        }
        "content_block_delta" => match e.delta.kind.as_str() {
            "text_delta" => {
                if let Some(text) = non_empty(e.delta.text) {
                    return vec![NormalizedDelta::Text(text)];
                }
            }
            "thinking_delta" => {
                if let Some(thinking) = non_empty(e.delta.thinking) {
                    return vec![NormalizedDelta::Reasoning(thinking)];
                }
            }
            "input_json_delta" => {
                if let Some(partial) = non_empty(e.delta.partial_json) {
                    return vec![NormalizedDelta::ToolCallArgumentsDelta {
                        index: e.index,
                        delta: partial,
                    }];
                }
            }
            _ => {}
        },
        // content_block_stop carries no content, and deciding whether the
        // block was a tool_use would need state from content_block_start.
        // Consumers that need completion records run the accumulator, which
        // does not require a done delta.
        "message_stop" => {
            return vec![NormalizedDelta::Done];
        }
        _ => {}
    }

    Vec::new()
}

// ---------------------------------------------------------------------------
// models (Gemini)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct GeminiChunk {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiStreamContent,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiStreamContent {
    #[serde(default)]
    parts: Vec<GeminiStreamPart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamPart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    #[serde(default)]
    function_call: Option<GeminiFunctionCallPart>,
    #[serde(default)]
    thought_signature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiFunctionCallPart {
    #[serde(default)]
    name: String,
    #[serde(default)]
    args: Option<serde_json::Value>,
}

fn parse_gemini_delta(data: &str) -> Vec<NormalizedDelta> {
    let Ok(chunk) = serde_json::from_str::<GeminiChunk>(data) else {
        return Vec::new();
    };
    let Some(cand) = chunk.candidates.into_iter().next() else {
        return Vec::new();
    };

    let mut out = Vec::new();

    for (i, part) in cand.content.parts.into_iter().enumerate() {
        if let Some(fc) = part.function_call {
            // Gemini never supplies a call id; synthesize a stable one from
            // the part index. The thought signature rides along so callers
            // can echo it back on the tool response.
            let id = format!("gemini-{i}");
            let signature = part.thought_signature.filter(|s| !s.is_empty());
            out.push(NormalizedDelta::ToolCallBegin {
                index: i,
                id: id.clone(),
                name: fc.name.clone(),
                signature: signature.clone(),
            });
            if let Some(args) = fc.args {
                let args = args.to_string();
                out.push(NormalizedDelta::ToolCallArgumentsDelta {
                    index: i,
                    delta: args.clone(),
                });
                out.push(NormalizedDelta::ToolCallDone {
                    index: i,
                    id,
                    name: fc.name,
                    signature,
                    arguments_full: args,
                });
            }
            continue;
        }
        let Some(text) = part.text.filter(|s| !s.is_empty()) else {
            continue;
        };
        if part.thought {
            out.push(NormalizedDelta::Reasoning(text));
        } else {
            out.push(NormalizedDelta::Text(text));
        }
    }

    if let Some(reason) = cand.finish_reason {
        if !reason.is_empty() && reason != "FINISH_REASON_UNSPECIFIED" {
            out.push(NormalizedDelta::Done);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(endpoint: Endpoint, name: &str, data: &str) -> UnifiedEvent {
        UnifiedEvent {
            endpoint,
            event: name.to_string(),
            data: data.to_string(),
            raw: data.to_string(),
        }
    }

    // -- chat/completions --

    #[test]
    fn test_chat_reasoning_then_text_then_done() {
        let deltas = parse_normalized_event(&event(
            Endpoint::ChatCompletions,
            "",
            r#"{"choices":[{"delta":{"reasoning_content":"thinking"}}]}"#,
        ));
        assert_eq!(deltas, vec![NormalizedDelta::Reasoning("thinking".into())]);

        let deltas = parse_normalized_event(&event(
            Endpoint::ChatCompletions,
            "",
            r#"{"choices":[{"delta":{"content":"answer"}}]}"#,
        ));
        assert_eq!(deltas, vec![NormalizedDelta::Text("answer".into())]);

        let deltas = parse_normalized_event(&event(
            Endpoint::ChatCompletions,
            "",
            r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#,
        ));
        assert_eq!(deltas, vec![NormalizedDelta::Done]);
    }

    #[test]
    fn test_chat_reasoning_field_variants() {
        let deltas = parse_normalized_event(&event(
            Endpoint::ChatCompletions,
            "",
            r#"{"choices":[{"delta":{"reasoning":"a","reasoning_details":[{"text":"b"},{"text":""}]}}]}"#,
        ));
        assert_eq!(
            deltas,
            vec![
                NormalizedDelta::Reasoning("a".into()),
                NormalizedDelta::Reasoning("b".into()),
            ]
        );
    }

    #[test]
    fn test_chat_tool_call_begin_and_args() {
        let deltas = parse_normalized_event(&event(
            Endpoint::ChatCompletions,
            "",
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_9","function":{"name":"get_weather","arguments":"{\"ci"}}]}}]}"#,
        ));
        assert_eq!(
            deltas,
            vec![
                NormalizedDelta::ToolCallBegin {
                    index: 0,
                    id: "call_9".into(),
                    name: "get_weather".into(),
                    signature: None,
                },
                NormalizedDelta::ToolCallArgumentsDelta {
                    index: 0,
                    delta: "{\"ci".into(),
                },
            ]
        );
    }

    #[test]
    fn test_chat_args_continuation_has_no_begin() {
        let deltas = parse_normalized_event(&event(
            Endpoint::ChatCompletions,
            "",
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"ty\":\"Paris\"}"}}]}}]}"#,
        ));
        assert_eq!(
            deltas,
            vec![NormalizedDelta::ToolCallArgumentsDelta {
                index: 0,
                delta: "ty\":\"Paris\"}".into(),
            }]
        );
    }

    #[test]
    fn test_chat_empty_choices() {
        assert!(parse_normalized_event(&event(Endpoint::ChatCompletions, "", r#"{"choices":[]}"#))
            .is_empty());
    }

    // -- responses --

    #[test]
    fn test_responses_text_reasoning_done() {
        let deltas = parse_normalized_event(&event(
            Endpoint::Responses,
            "",
            r#"{"type":"response.reasoning_summary_text.delta","delta":"r"}"#,
        ));
        assert_eq!(deltas, vec![NormalizedDelta::Reasoning("r".into())]);

        let deltas = parse_normalized_event(&event(
            Endpoint::Responses,
            "",
            r#"{"type":"response.output_text.delta","delta":"t"}"#,
        ));
        assert_eq!(deltas, vec![NormalizedDelta::Text("t".into())]);

        let deltas = parse_normalized_event(&event(
            Endpoint::Responses,
            "",
            r#"{"type":"response.completed"}"#,
        ));
        assert_eq!(deltas, vec![NormalizedDelta::Done]);
    }

    #[test]
    fn test_responses_function_call_item_added() {
        let deltas = parse_normalized_event(&event(
            Endpoint::Responses,
            "",
            r#"{"type":"response.output_item.added","output_index":1,"item":{"type":"function_call","call_id":"call_7","name":"calc"}}"#,
        ));
        assert_eq!(
            deltas,
            vec![NormalizedDelta::ToolCallBegin {
                index: 1,
                id: "call_7".into(),
                name: "calc".into(),
                signature: None,
            }]
        );
    }

    #[test]
    fn test_responses_item_id_fallback() {
        let deltas = parse_normalized_event(&event(
            Endpoint::Responses,
            "",
            r#"{"type":"response.output_item.added","output_index":0,"item":{"type":"function_call","id":"item_3","tool_name":"calc"}}"#,
        ));
        assert_eq!(
            deltas,
            vec![NormalizedDelta::ToolCallBegin {
                index: 0,
                id: "item_3".into(),
                name: "calc".into(),
                signature: None,
            }]
        );
    }

    #[test]
    fn test_responses_non_function_item_added_ignored() {
        assert!(parse_normalized_event(&event(
            Endpoint::Responses,
            "",
            r#"{"type":"response.output_item.added","item":{"type":"message"}}"#,
        ))
        .is_empty());
    }

    #[test]
    fn test_responses_arguments_delta_and_done_spellings() {
        for kind in [
            "response.function_call_arguments.delta",
            "response.function_call_arguments_delta",
        ] {
            let deltas = parse_normalized_event(&event(
                Endpoint::Responses,
                "",
                &format!(r#"{{"type":"{kind}","output_index":2,"delta":"{{\"x\":1}}"}}"#),
            ));
            assert_eq!(
                deltas,
                vec![NormalizedDelta::ToolCallArgumentsDelta {
                    index: 2,
                    delta: "{\"x\":1}".into(),
                }]
            );
        }

        for kind in [
            "response.function_call_arguments.done",
            "response.function_call_arguments_done",
        ] {
            let deltas = parse_normalized_event(&event(
                Endpoint::Responses,
                "",
                &format!(
                    r#"{{"type":"{kind}","output_index":2,"item_id":"item_5","name":"calc","arguments":"{{\"x\":1}}"}}"#
                ),
            ));
            assert_eq!(
                deltas,
                vec![NormalizedDelta::ToolCallDone {
                    index: 2,
                    id: "item_5".into(),
                    name: "calc".into(),
                    signature: None,
                    arguments_full: "{\"x\":1}".into(),
                }]
            );
        }
    }

    #[test]
    fn test_responses_call_id_preferred_over_item_id() {
        let deltas = parse_normalized_event(&event(
            Endpoint::Responses,
            "",
            r#"{"type":"response.function_call_arguments.done","call_id":"call_1","item_id":"item_1","arguments":"{}"}"#,
        ));
        match &deltas[0] {
            NormalizedDelta::ToolCallDone { id, .. } => assert_eq!(id, "call_1"),
            other => panic!("expected ToolCallDone, got {other:?}"),
        }
    }

    // -- messages (Anthropic) --

    #[test]
    fn test_anthropic_tool_use_sequence() {
        let deltas = parse_normalized_event(&event(
            Endpoint::Messages,
            "content_block_start",
            r#"{"type":"content_block_start","index":1,"content_block":{"type":"tool_use","id":"toolu_abc","name":"calculator"}}"#,
        ));
        assert_eq!(
            deltas,
            vec![NormalizedDelta::ToolCallBegin {
                index: 1,
                id: "toolu_abc".into(),
                name: "calculator".into(),
                signature: None,
            }]
        );

        let deltas = parse_normalized_event(&event(
            Endpoint::Messages,
            "content_block_delta",
            r#"{"type":"content_block_delta","index":1,"delta":{"type":"input_json_delta","partial_json":"{\"x\":"}}"#,
        ));
        assert_eq!(
            deltas,
            vec![NormalizedDelta::ToolCallArgumentsDelta {
                index: 1,
                delta: "{\"x\":".into(),
            }]
        );

        let deltas = parse_normalized_event(&event(
            Endpoint::Messages,
            "message_stop",
            r#"{"type":"message_stop"}"#,
        ));
        assert_eq!(deltas, vec![NormalizedDelta::Done]);
    }

    #[test]
    fn test_anthropic_text_and_thinking_deltas() {
        let deltas = parse_normalized_event(&event(
            Endpoint::Messages,
            "content_block_delta",
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#,
        ));
        assert_eq!(deltas, vec![NormalizedDelta::Text("Hi".into())]);

        let deltas = parse_normalized_event(&event(
            Endpoint::Messages,
            "content_block_delta",
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"thinking_delta","thinking":"hmm"}}"#,
        ));
        assert_eq!(deltas, vec![NormalizedDelta::Reasoning("hmm".into())]);
    }

    #[test]
    fn test_anthropic_event_name_fallback() {
        // Body without a "type" field: the SSE event name decides.
        let deltas = parse_normalized_event(&event(
            Endpoint::Messages,
            "message_stop",
            r#"{}"#,
        ));
        assert_eq!(deltas, vec![NormalizedDelta::Done]);
    }

    #[test]
    fn test_anthropic_content_block_stop_emits_nothing() {
        assert!(parse_normalized_event(&event(
            Endpoint::Messages,
            "content_block_stop",
            r#"{"type":"content_block_stop","index":1}"#,
        ))
        .is_empty());
    }

    #[test]
    fn test_anthropic_ping_ignored() {
        assert!(parse_normalized_event(&event(
            Endpoint::Messages,
            "ping",
            r#"{"type":"ping"}"#,
        ))
        .is_empty());
    }

    // -- models (Gemini) --

    #[test]
    fn test_gemini_mixed_chunk() {
        let deltas = parse_normalized_event(&event(
            Endpoint::Models,
            "",
            r#"{"candidates":[{"content":{"parts":[{"text":"thinking","thought":true},{"text":"answer"}]},"finishReason":"STOP"}]}"#,
        ));
        assert_eq!(
            deltas,
            vec![
                NormalizedDelta::Reasoning("thinking".into()),
                NormalizedDelta::Text("answer".into()),
                NormalizedDelta::Done,
            ]
        );
    }

    #[test]
    fn test_gemini_function_call_triplet() {
        let deltas = parse_normalized_event(&event(
            Endpoint::Models,
            "",
            r#"{"candidates":[{"content":{"parts":[{"functionCall":{"name":"get_weather","args":{"city":"Paris"}},"thoughtSignature":"sig_1"}]}}]}"#,
        ));
        let args = r#"{"city":"Paris"}"#.to_string();
        assert_eq!(
            deltas,
            vec![
                NormalizedDelta::ToolCallBegin {
                    index: 0,
                    id: "gemini-0".into(),
                    name: "get_weather".into(),
                    signature: Some("sig_1".into()),
                },
                NormalizedDelta::ToolCallArgumentsDelta {
                    index: 0,
                    delta: args.clone(),
                },
                NormalizedDelta::ToolCallDone {
                    index: 0,
                    id: "gemini-0".into(),
                    name: "get_weather".into(),
                    signature: Some("sig_1".into()),
                    arguments_full: args,
                },
            ]
        );
    }

    #[test]
    fn test_gemini_function_call_index_follows_part_position() {
        let deltas = parse_normalized_event(&event(
            Endpoint::Models,
            "",
            r#"{"candidates":[{"content":{"parts":[{"text":"lead"},{"functionCall":{"name":"calc","args":{}}}]}}]}"#,
        ));
        assert_eq!(deltas[0], NormalizedDelta::Text("lead".into()));
        match &deltas[1] {
            NormalizedDelta::ToolCallBegin { index, id, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(id, "gemini-1");
            }
            other => panic!("expected ToolCallBegin, got {other:?}"),
        }
    }

    #[test]
    fn test_gemini_unspecified_finish_reason_is_not_done() {
        let deltas = parse_normalized_event(&event(
            Endpoint::Models,
            "",
            r#"{"candidates":[{"content":{"parts":[{"text":"x"}]},"finishReason":"FINISH_REASON_UNSPECIFIED"}]}"#,
        ));
        assert_eq!(deltas, vec![NormalizedDelta::Text("x".into())]);
    }

    // -- shared --

    #[test]
    fn test_invalid_json_yields_no_deltas() {
        for endpoint in [
            Endpoint::ChatCompletions,
            Endpoint::Responses,
            Endpoint::Messages,
            Endpoint::Models,
        ] {
            assert!(parse_normalized_event(&event(endpoint, "", "not json")).is_empty());
        }
    }

    #[test]
    fn test_empty_data_yields_no_deltas() {
        assert!(parse_normalized_event(&event(Endpoint::ChatCompletions, "", "")).is_empty());
    }
}
