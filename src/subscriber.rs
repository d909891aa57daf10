//! Event stream subscriber for `/api/cpus`.
//!
//! Keeps one long-lived `text/event-stream` request open, turns each
//! `message` event into a [`Sample`] and publishes it to the display state.
//! Reconnects the way a browser EventSource does: fixed delay, server may
//! change it with `retry:`, permanent failure on a bad status or content type.

use std::convert::Infallible;
use std::time::Duration;

use futures_util::{pin_mut, Stream, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

use crate::config::{clamp_retry_ms, CpuviewConfig};
use crate::sample::Sample;
use crate::sse::{EventDecoder, SseEvent, DEFAULT_EVENT};
use crate::state::{ConnectionState, DisplayState};

const EVENT_STREAM: &str = "text/event-stream";

#[derive(Error, Debug)]
pub enum SubscribeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(StatusCode),

    #[error("unexpected content type {0:?}")]
    ContentType(String),
}

impl SubscribeError {
    /// Errors after which the stream is not retried
    pub fn is_fatal(&self) -> bool {
        match self {
            SubscribeError::Http(e) => e.is_builder(),
            SubscribeError::Status(_) | SubscribeError::ContentType(_) => true,
        }
    }
}

pub struct Subscriber {
    client: Client,
    endpoint: String,
    retry: Duration,
    decoder: EventDecoder,
    accepted: u64,
    rejected: u64,
}

impl Subscriber {
    pub fn new(config: &CpuviewConfig) -> Result<Self, SubscribeError> {
        // No overall timeout: the response body is meant to stay open.
        let client = Client::builder()
            .connect_timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &CpuviewConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint(),
            retry: config.retry(),
            decoder: EventDecoder::new(),
            accepted: 0,
            rejected: 0,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current reconnection delay
    pub fn retry(&self) -> Duration {
        self.retry
    }

    /// Messages published to the display state so far
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Messages dropped because their payload was not a sample
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Stay subscribed until the stream fails permanently.
    pub async fn run(&mut self, state: &DisplayState) -> Result<Infallible, SubscribeError> {
        loop {
            state.set_connection(ConnectionState::Connecting);

            match self.connect().await {
                Ok(response) => {
                    tracing::info!(endpoint = %self.endpoint, "event stream open");
                    state.set_connection(ConnectionState::Open);
                    self.decoder.begin_stream();
                    match self.consume(response.bytes_stream(), state).await {
                        Ok(()) => tracing::info!("event stream closed by server"),
                        Err(e) => tracing::warn!(error = %e, "event stream interrupted"),
                    }
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(error = %e, endpoint = %self.endpoint, "event stream failed");
                    state.set_connection(ConnectionState::Closed {
                        reason: e.to_string(),
                    });
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(error = %e, endpoint = %self.endpoint, "connection attempt failed");
                }
            }

            state.set_connection(ConnectionState::Reconnecting { delay: self.retry });
            tracing::debug!(delay_ms = self.retry.as_millis() as u64, "reconnecting");
            tokio::time::sleep(self.retry).await;
        }
    }

    async fn connect(&self) -> Result<Response, SubscribeError> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache");
        if let Some(id) = self.decoder.last_event_id() {
            request = request.header("Last-Event-ID", id);
        }

        let response = request.send().await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        check_response(response.status(), content_type)?;
        Ok(response)
    }

    /// Read one response body to the end, publishing every valid sample.
    ///
    /// Events are handled one at a time in arrival order, even when a chunk
    /// carries several. Returns the transport error if the body breaks off.
    /// Bad payloads never end the stream.
    pub async fn consume<S, B, E>(&mut self, stream: S, state: &DisplayState) -> Result<(), E>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
    {
        pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for event in self.decoder.feed(chunk.as_ref()) {
                self.handle_event(event, state).await;
            }
            if let Some(retry) = self.decoder.take_retry() {
                let ms = clamp_retry_ms(retry.as_millis() as u64);
                tracing::debug!(retry_ms = ms, "server set reconnection delay");
                self.retry = Duration::from_millis(ms);
            }
        }
        Ok(())
    }

    async fn handle_event(&mut self, event: SseEvent, state: &DisplayState) {
        if event.event != DEFAULT_EVENT {
            tracing::debug!(event = %event.event, "ignoring event");
            return;
        }

        match Sample::from_json(&event.data) {
            Ok(sample) => {
                self.accepted += 1;
                tracing::trace!(cores = sample.len(), "sample received");
                state.publish(sample).await;
            }
            Err(e) => {
                self.rejected += 1;
                tracing::warn!(error = %e, id = ?event.id, "dropping message");
            }
        }
    }
}

/// A usable stream response is a 200 with an event-stream content type.
pub fn check_response(status: StatusCode, content_type: Option<&str>) -> Result<(), SubscribeError> {
    if status != StatusCode::OK {
        return Err(SubscribeError::Status(status));
    }
    let content_type = content_type.unwrap_or_default();
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if !essence.eq_ignore_ascii_case(EVENT_STREAM) {
        return Err(SubscribeError::ContentType(content_type.to_string()));
    }
    Ok(())
}
