pub mod parse;
pub mod sse;
pub mod tool_calls;

use std::collections::VecDeque;

use tokio::sync::mpsc;

use crate::error::ZenError;
use crate::routing::Endpoint;
use crate::stream::parse::{parse_normalized_event, NormalizedDelta};

/// One framed SSE record. `event` is empty for unnamed events; `data` is the
/// joined payload of the record's `data:` lines and `raw` the same text as
/// received (parsers consume `data`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEvent {
    pub event: String,
    pub data: String,
    pub raw: String,
}

/// A [`StreamEvent`] annotated with the dialect it was produced by. The delta
/// parser dispatches on `endpoint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedEvent {
    pub endpoint: Endpoint,
    pub event: String,
    pub data: String,
    pub raw: String,
}

/// Raw framed events from one streaming request.
///
/// Events arrive in framing order. The channel closes exactly once, on
/// graceful completion (`[DONE]` or EOF) or on error; after it closes,
/// [`RawEventStream::take_error`] reports a mid-stream read error if one
/// occurred. Dropping the stream cancels the producer and closes the
/// underlying response body.
#[derive(Debug)]
pub struct RawEventStream {
    events: mpsc::Receiver<StreamEvent>,
    errs: mpsc::Receiver<ZenError>,
}

impl RawEventStream {
    pub(crate) fn new(events: mpsc::Receiver<StreamEvent>, errs: mpsc::Receiver<ZenError>) -> Self {
        Self { events, errs }
    }

    /// Next framed event, or `None` when the stream has ended.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    /// The stream's error, if it ended with one. Call after [`Self::recv`]
    /// returns `None`.
    pub async fn take_error(&mut self) -> Option<ZenError> {
        self.errs.recv().await
    }
}

/// Framed events annotated with their resolved dialect.
#[derive(Debug)]
pub struct UnifiedEventStream {
    endpoint: Endpoint,
    inner: RawEventStream,
}

impl UnifiedEventStream {
    pub(crate) fn new(endpoint: Endpoint, inner: RawEventStream) -> Self {
        Self { endpoint, inner }
    }

    /// The dialect this stream was routed to.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Next event, or `None` when the stream has ended.
    pub async fn recv(&mut self) -> Option<UnifiedEvent> {
        let ev = self.inner.recv().await?;
        Some(UnifiedEvent {
            endpoint: self.endpoint,
            event: ev.event,
            data: ev.data,
            raw: ev.raw,
        })
    }

    /// The stream's error, if it ended with one.
    pub async fn take_error(&mut self) -> Option<ZenError> {
        self.inner.take_error().await
    }
}

/// Normalized deltas parsed from a unified event stream.
///
/// Delta order is exactly the framing order of the underlying events, with
/// within-event deltas in their documented order. Events the parser does not
/// recognize produce no deltas.
#[derive(Debug)]
pub struct DeltaStream {
    inner: UnifiedEventStream,
    pending: VecDeque<NormalizedDelta>,
}

impl DeltaStream {
    pub(crate) fn new(inner: UnifiedEventStream) -> Self {
        Self {
            inner,
            pending: VecDeque::new(),
        }
    }

    /// The dialect this stream was routed to.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        self.inner.endpoint()
    }

    /// Next normalized delta, or `None` when the stream has ended.
    pub async fn recv(&mut self) -> Option<NormalizedDelta> {
        loop {
            if let Some(delta) = self.pending.pop_front() {
                return Some(delta);
            }
            let event = self.inner.recv().await?;
            self.pending.extend(parse_normalized_event(&event));
        }
    }

    /// The stream's error, if it ended with one.
    pub async fn take_error(&mut self) -> Option<ZenError> {
        self.inner.take_error().await
    }
}
