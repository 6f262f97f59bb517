use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use http::{HeaderMap, Method};
use tokio::sync::mpsc;

use crate::auth::request_headers;
use crate::config::Config;
use crate::error::{ApiError, ZenError};
use crate::routing::Endpoint;
use crate::stream::sse::SseFramer;
use crate::stream::{RawEventStream, StreamEvent};

use super::retry_policy::{is_idempotent, is_retryable_status};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Capacity of the per-stream event channel. One slot: the producer blocks
/// on a slow consumer rather than buffering the stream.
const STREAM_CHANNEL_CAPACITY: usize = 1;

/// HTTP transport shared by every call on a [`crate::Client`].
///
/// Holds the connection pool; safe for concurrent use. Both the blocking and
/// the streaming paths build their headers through
/// [`crate::auth::request_headers`] so auth selection cannot diverge between
/// them.
pub struct HttpTransport {
    client: reqwest::Client,
    config: Config,
}

impl HttpTransport {
    /// Build a transport from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ZenError::Config`] when the internal HTTP client cannot be
    /// constructed.
    pub fn new(config: Config) -> Result<Self, ZenError> {
        let client = match &config.http_client {
            Some(client) => client.clone(),
            None => {
                let mut builder = reqwest::Client::builder()
                    .connect_timeout(CONNECT_TIMEOUT)
                    .tcp_nodelay(true);
                // No total deadline by default: it would kill long SSE reads.
                if let Some(timeout) = config.timeout {
                    builder = builder.timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|e| ZenError::Config(format!("failed to build HTTP client: {e}")))?
            }
        };

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.config.base_url, path)
        } else {
            format!("{}/{}", self.config.base_url, path)
        }
    }

    /// Send one non-streaming request, retrying per the configured policy.
    ///
    /// Retries apply to transport errors and to the retryable status set
    /// {429, 500, 502, 503, 504}; non-idempotent methods retry only with the
    /// caller's opt-in. Only the final attempt's error surfaces.
    ///
    /// # Errors
    ///
    /// Returns [`ZenError::Transport`] for connection-level failures and
    /// [`ZenError::Api`] for non-2xx responses.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Bytes,
        endpoint: Endpoint,
        force_all_auth: bool,
    ) -> Result<(Bytes, HeaderMap), ZenError> {
        let url = self.url_for(path);
        let headers = request_headers(&self.config, endpoint, !body.is_empty(), false, force_all_auth);

        let mut retries = self.config.retry.max_retries;
        if !is_idempotent(&method) && !self.config.retry.retry_on_non_idempotent {
            retries = 0;
        }

        let mut last_err: Option<ZenError> = None;
        for attempt in 0..=retries {
            let response = self
                .client
                .request(method.clone(), &url)
                .headers(headers.clone())
                .body(body.clone())
                .send()
                .await;

            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    let err = ZenError::Transport(err.to_string());
                    if attempt < retries {
                        tracing::debug!(
                            attempt,
                            error = %err,
                            "retrying request after transport error"
                        );
                        last_err = Some(err);
                        tokio::time::sleep((self.config.retry.backoff)(attempt)).await;
                        continue;
                    }
                    return Err(err);
                }
            };

            let status = response.status().as_u16();
            let response_headers = response.headers().clone();
            let payload = response
                .bytes()
                .await
                .map_err(|e| ZenError::Transport(e.to_string()))?;

            if (200..300).contains(&status) {
                return Ok((payload, response_headers));
            }

            let api_err = ApiError::from_response(status, &response_headers, payload);
            if attempt < retries && is_retryable_status(status) {
                tracing::debug!(status, attempt, "retrying request after retryable status");
                last_err = Some(ZenError::Api(api_err));
                tokio::time::sleep((self.config.retry.backoff)(attempt)).await;
                continue;
            }
            return Err(ZenError::Api(api_err));
        }

        // Reached only when the final attempt recorded an error and the loop
        // bound was consumed.
        Err(last_err.unwrap_or_else(|| ZenError::Transport("retries exhausted".to_string())))
    }

    /// Open a streaming request and return its framed SSE events.
    ///
    /// Streaming requests are never retried. The returned stream owns one
    /// producer task; dropping the event receiver cancels it and closes the
    /// underlying response body.
    ///
    /// # Errors
    ///
    /// Returns [`ZenError::Transport`] for connection-level failures and
    /// [`ZenError::Api`] for non-2xx responses (whose body is read in full
    /// before returning).
    pub async fn open_stream(
        &self,
        method: Method,
        path: &str,
        body: Bytes,
        endpoint: Endpoint,
    ) -> Result<RawEventStream, ZenError> {
        let url = self.url_for(path);
        let headers = request_headers(&self.config, endpoint, !body.is_empty(), true, false);

        let response = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| ZenError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let response_headers = response.headers().clone();
            let payload = response
                .bytes()
                .await
                .map_err(|e| ZenError::Transport(e.to_string()))?;
            return Err(ZenError::Api(ApiError::from_response(
                status,
                &response_headers,
                payload,
            )));
        }

        let (events_tx, events_rx) = mpsc::channel::<StreamEvent>(STREAM_CHANNEL_CAPACITY);
        let (err_tx, err_rx) = mpsc::channel::<ZenError>(1);

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut framer = SseFramer::new();
            let mut parsed: Vec<StreamEvent> = Vec::new();

            loop {
                match body.next().await {
                    Some(Ok(chunk)) => {
                        let done = framer.feed(&chunk, &mut parsed);
                        for event in parsed.drain(..) {
                            if events_tx.send(event).await.is_err() {
                                // Consumer gone: dropping `body` aborts the
                                // in-flight connection.
                                return;
                            }
                        }
                        if done {
                            return;
                        }
                    }
                    Some(Err(err)) => {
                        // Mid-stream read error: surface it on the error
                        // slot and close without a final flush.
                        let _ = err_tx.try_send(ZenError::StreamProtocol(err.to_string()));
                        return;
                    }
                    None => {
                        framer.finish(&mut parsed);
                        for event in parsed.drain(..) {
                            if events_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        return;
                    }
                }
            }
        });

        Ok(RawEventStream::new(events_rx, err_rx))
    }
}
