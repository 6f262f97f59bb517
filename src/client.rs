use bytes::Bytes;
use http::Method;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::ZenError;
use crate::protocol;
use crate::protocol::normalized::NormalizedRequest;
use crate::routing::{resolve_path, route_for_model, strip_opencode_prefix, Endpoint};
use crate::stream::{DeltaStream, RawEventStream, UnifiedEventStream};
use crate::transport::HttpTransport;

/// Client for the Zen gateway.
///
/// Cheap to share behind an `Arc`; the underlying HTTP connection pool is
/// reused across concurrent calls. Configuration is immutable after
/// construction.
pub struct Client {
    transport: HttpTransport,
}

/// One entry of the gateway's model listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub owned_by: String,
}

/// Response of [`Client::list_models`], keeping the raw body alongside the
/// decoded entries.
#[derive(Debug, Clone, Default)]
pub struct ModelsResponse {
    pub data: Vec<Model>,
    pub raw: Bytes,
}

#[derive(Debug, Default, Deserialize)]
struct ModelsResponseWire {
    #[serde(default)]
    data: Vec<Model>,
}

impl Client {
    /// Build a client, validating the config and filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ZenError::Config`] for a missing API key or an HTTP client
    /// that cannot be constructed.
    pub fn new(mut config: Config) -> crate::Result<Self> {
        config.apply_defaults()?;
        Ok(Self {
            transport: HttpTransport::new(config)?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        self.transport.config()
    }

    // -----------------------------------------------------------------------
    // Normalized entry points
    // -----------------------------------------------------------------------

    /// Blocking call: route, translate, send, and return the raw response
    /// body.
    ///
    /// # Errors
    ///
    /// Propagates translation errors, [`ZenError::Transport`],
    /// [`ZenError::Api`], and for the Models dialect
    /// [`ZenError::EmptyResponse`].
    pub async fn create(&self, req: &NormalizedRequest) -> crate::Result<Bytes> {
        let (_, body) = self.create_normalized(req).await?;
        Ok(body)
    }

    /// Like [`Self::create`], also returning the dialect the request was
    /// routed to.
    ///
    /// A blocking call routed to the Models dialect transparently drains the
    /// SSE stream and returns the last non-empty event's data: the gateway's
    /// non-stream Gemini handler reads usage from the wrong field and
    /// crashes, while the final SSE chunk carries the full text plus
    /// `usageMetadata`.
    ///
    /// # Errors
    ///
    /// See [`Self::create`].
    pub async fn create_normalized(
        &self,
        req: &NormalizedRequest,
    ) -> crate::Result<(Endpoint, Bytes)> {
        let (endpoint, path, req) = self.prepare(req, false)?;
        let payload = encode_payload(endpoint, &req)?;

        if endpoint == Endpoint::Models {
            let body = self.drain_last_event(&path, payload).await?;
            return Ok((endpoint, body));
        }

        let (body, _) = self
            .transport
            .request(Method::POST, &path, payload, endpoint, false)
            .await?;
        Ok((endpoint, body))
    }

    /// Open a streaming call and return raw SSE events annotated with the
    /// resolved dialect.
    ///
    /// # Errors
    ///
    /// Propagates translation errors, [`ZenError::Transport`], and
    /// [`ZenError::Api`] for a non-2xx response.
    pub async fn stream_events(
        &self,
        req: &NormalizedRequest,
    ) -> crate::Result<UnifiedEventStream> {
        let (endpoint, path, req) = self.prepare(req, true)?;
        let payload = encode_payload(endpoint, &req)?;
        let raw = self
            .transport
            .open_stream(Method::POST, &path, payload, endpoint)
            .await?;
        Ok(UnifiedEventStream::new(endpoint, raw))
    }

    /// Open a streaming call and parse its events into normalized deltas.
    ///
    /// # Errors
    ///
    /// See [`Self::stream_events`].
    pub async fn stream(&self, req: &NormalizedRequest) -> crate::Result<DeltaStream> {
        Ok(DeltaStream::new(self.stream_events(req).await?))
    }

    fn prepare(
        &self,
        req: &NormalizedRequest,
        streaming: bool,
    ) -> crate::Result<(Endpoint, String, NormalizedRequest)> {
        let mut req = req.clone();
        req.model = strip_opencode_prefix(&req.model).to_string();
        if streaming {
            req.stream = true;
        }
        let endpoint = req.endpoint.unwrap_or_else(|| route_for_model(&req.model));
        let path = resolve_path(endpoint, &req.model)?;
        Ok((endpoint, path, req))
    }

    async fn drain_last_event(&self, path: &str, payload: Bytes) -> crate::Result<Bytes> {
        let mut stream = self
            .transport
            .open_stream(Method::POST, path, payload, Endpoint::Models)
            .await?;

        let mut last: Option<String> = None;
        while let Some(event) = stream.recv().await {
            if !event.data.is_empty() {
                last = Some(event.data);
            }
        }
        if let Some(err) = stream.take_error().await {
            return Err(err);
        }
        last.map(Bytes::from).ok_or(ZenError::EmptyResponse)
    }

    // -----------------------------------------------------------------------
    // Dialect passthrough
    // -----------------------------------------------------------------------

    /// POST a caller-built body straight to `/responses`.
    ///
    /// # Errors
    ///
    /// Propagates [`ZenError::Transport`] and [`ZenError::Api`].
    pub async fn create_response(&self, body: &Value) -> crate::Result<Bytes> {
        self.passthrough(Endpoint::Responses, "/responses", body).await
    }

    /// POST a caller-built body straight to `/chat/completions`.
    ///
    /// # Errors
    ///
    /// Propagates [`ZenError::Transport`] and [`ZenError::Api`].
    pub async fn create_chat_completion(&self, body: &Value) -> crate::Result<Bytes> {
        self.passthrough(Endpoint::ChatCompletions, "/chat/completions", body)
            .await
    }

    /// POST a caller-built body straight to `/messages`.
    ///
    /// # Errors
    ///
    /// Propagates [`ZenError::Transport`] and [`ZenError::Api`].
    pub async fn create_message(&self, body: &Value) -> crate::Result<Bytes> {
        self.passthrough(Endpoint::Messages, "/messages", body).await
    }

    /// Blocking Gemini call with a caller-built body. Uses the same
    /// streaming workaround as the normalized path.
    ///
    /// # Errors
    ///
    /// Propagates [`ZenError::Transport`], [`ZenError::Api`], and
    /// [`ZenError::EmptyResponse`].
    pub async fn create_model_content(&self, model: &str, body: &Value) -> crate::Result<Bytes> {
        let path = resolve_path(Endpoint::Models, model)?;
        self.drain_last_event(&path, to_payload(body)?).await
    }

    /// Open a raw `/responses` stream with a caller-built body.
    ///
    /// # Errors
    ///
    /// See [`Self::stream_events`].
    pub async fn stream_response(&self, body: &Value) -> crate::Result<RawEventStream> {
        self.passthrough_stream(Endpoint::Responses, "/responses", body)
            .await
    }

    /// Open a raw `/chat/completions` stream with a caller-built body.
    ///
    /// # Errors
    ///
    /// See [`Self::stream_events`].
    pub async fn stream_chat_completion(&self, body: &Value) -> crate::Result<RawEventStream> {
        self.passthrough_stream(Endpoint::ChatCompletions, "/chat/completions", body)
            .await
    }

    /// Open a raw `/messages` stream with a caller-built body.
    ///
    /// # Errors
    ///
    /// See [`Self::stream_events`].
    pub async fn stream_message(&self, body: &Value) -> crate::Result<RawEventStream> {
        self.passthrough_stream(Endpoint::Messages, "/messages", body)
            .await
    }

    /// Open a raw Gemini stream with a caller-built body.
    ///
    /// # Errors
    ///
    /// See [`Self::stream_events`].
    pub async fn stream_model_content(
        &self,
        model: &str,
        body: &Value,
    ) -> crate::Result<RawEventStream> {
        let path = resolve_path(Endpoint::Models, model)?;
        self.transport
            .open_stream(Method::POST, &path, to_payload(body)?, Endpoint::Models)
            .await
    }

    /// `GET /models`: list the models the gateway serves.
    ///
    /// # Errors
    ///
    /// Propagates [`ZenError::Transport`] and [`ZenError::Api`];
    /// [`ZenError::InvalidRequest`] when the listing cannot be decoded.
    pub async fn list_models(&self) -> crate::Result<ModelsResponse> {
        let (body, _) = self
            .transport
            .request(Method::GET, "/models", Bytes::new(), Endpoint::Models, true)
            .await?;
        let wire: ModelsResponseWire = serde_json::from_slice(&body)
            .map_err(|e| ZenError::InvalidRequest(format!("failed to decode model list: {e}")))?;
        Ok(ModelsResponse {
            data: wire.data,
            raw: body,
        })
    }

    async fn passthrough(
        &self,
        endpoint: Endpoint,
        path: &str,
        body: &Value,
    ) -> crate::Result<Bytes> {
        let (bytes, _) = self
            .transport
            .request(Method::POST, path, to_payload(body)?, endpoint, false)
            .await?;
        Ok(bytes)
    }

    async fn passthrough_stream(
        &self,
        endpoint: Endpoint,
        path: &str,
        body: &Value,
    ) -> crate::Result<RawEventStream> {
        self.transport
            .open_stream(Method::POST, path, to_payload(body)?, endpoint)
            .await
    }
}

fn encode_payload(endpoint: Endpoint, req: &NormalizedRequest) -> crate::Result<Bytes> {
    let body = protocol::encode_request(endpoint, req)?;
    to_payload(&body)
}

fn to_payload(body: &Value) -> crate::Result<Bytes> {
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(|e| ZenError::InvalidRequest(format!("failed to serialize body: {e}")))
}
