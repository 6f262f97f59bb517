use rustc_hash::FxHashMap;

use super::parse::NormalizedDelta;

/// A fully assembled tool call extracted from a stream.
///
/// `arguments` is opaque JSON text exactly as the provider delivered it; the
/// caller, not the accumulator, validates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
    pub thought_signature: Option<String>,
}

/// Stitches streaming tool-call fragments into complete calls.
///
/// Feed every [`NormalizedDelta`] to [`Self::apply`], then call
/// [`Self::complete_calls`] once the stream ends. Calls are keyed by the
/// provider-supplied per-response index (ids are not trustworthy at begin
/// time) and returned in first-seen index order. A `ToolCallDone` delta is
/// not required: concatenated argument fragments stand in when no full
/// snapshot arrived.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: FxHashMap<usize, ToolCallState>,
    order: Vec<usize>,
}

#[derive(Debug, Default)]
struct ToolCallState {
    id: String,
    name: String,
    signature: Option<String>,
    args: String,
    full: String,
}

impl ToolCallAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a single delta. Returns `true` when the delta affected tool
    /// state; non-tool deltas are left for the caller.
    pub fn apply(&mut self, delta: &NormalizedDelta) -> bool {
        match delta {
            NormalizedDelta::ToolCallBegin {
                index,
                id,
                name,
                signature,
            } => {
                let call = self.ensure(*index);
                call.absorb_identity(id, name, signature.as_deref());
                true
            }
            NormalizedDelta::ToolCallArgumentsDelta { index, delta } => {
                self.ensure(*index).args.push_str(delta);
                true
            }
            NormalizedDelta::ToolCallDone {
                index,
                id,
                name,
                signature,
                arguments_full,
            } => {
                let call = self.ensure(*index);
                call.absorb_identity(id, name, signature.as_deref());
                if !arguments_full.is_empty() {
                    call.full = arguments_full.clone();
                }
                true
            }
            _ => false,
        }
    }

    /// Whether any tool-call deltas have been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Fully assembled tool calls in first-seen order.
    ///
    /// Missing ids are filled with stable `tool-<index>` placeholders; when
    /// no `arguments_full` snapshot arrived, the concatenated argument
    /// fragments are used.
    #[must_use]
    pub fn complete_calls(&self) -> Vec<StreamToolCall> {
        self.order
            .iter()
            .filter_map(|index| {
                let call = self.calls.get(index)?;
                let id = if call.id.is_empty() {
                    format!("tool-{index}")
                } else {
                    call.id.clone()
                };
                let arguments = if call.full.is_empty() {
                    call.args.clone()
                } else {
                    call.full.clone()
                };
                Some(StreamToolCall {
                    id,
                    name: call.name.clone(),
                    arguments,
                    thought_signature: call.signature.clone(),
                })
            })
            .collect()
    }

    fn ensure(&mut self, index: usize) -> &mut ToolCallState {
        self.calls.entry(index).or_insert_with(|| {
            self.order.push(index);
            ToolCallState::default()
        })
    }
}

impl ToolCallState {
    /// First observed id, name, and signature stick; later values never
    /// overwrite them.
    fn absorb_identity(&mut self, id: &str, name: &str, signature: Option<&str>) {
        if self.id.is_empty() {
            self.id = id.to_string();
        }
        if self.name.is_empty() {
            self.name = name.to_string();
        }
        if self.signature.is_none() {
            self.signature = signature.filter(|s| !s.is_empty()).map(ToString::to_string);
        }
    }
}
