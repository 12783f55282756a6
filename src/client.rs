//! HTTP client for the Horizon backend.
//!
//! Wraps `reqwest` with the streaming chat/quiz endpoints and the small
//! JSON endpoints around them. Streaming response bodies are reassembled
//! into frames and decoded into typed [`StreamEvent`]s via the `sse`
//! module.

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;

use crate::error::ClientError;
use crate::models::{
    ChatHistoryResponse, ChatResetRequest, ChatStreamRequest, QuizStreamRequest,
    SessionListResponse,
};
use crate::sse::{self, FrameBuffer, StreamEvent};

/// Boxed stream of typed events from a streaming endpoint.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ClientError>> + Send>>;

/// Client for the Horizon backend API.
#[derive(Debug, Clone)]
pub struct HorizonClient {
    base_url: String,
    client: Client,
}

impl HorizonClient {
    /// Create a client for the given base URL (trailing slash tolerated).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open the streaming response for one chat turn.
    ///
    /// Sends `POST /chat/stream` and returns a stream that yields one item
    /// per decoded frame, in stream order. Frames without a `data:` line
    /// are skipped inside the stream.
    pub async fn chat_stream(&self, request: &ChatStreamRequest) -> Result<EventStream, ClientError> {
        self.open_stream("/chat/stream", request).await
    }

    /// Open a quiz generation stream. Same wire format as chat.
    pub async fn quiz_stream(&self, request: &QuizStreamRequest) -> Result<EventStream, ClientError> {
        self.open_stream("/quiz/stream", request).await
    }

    async fn open_stream<T>(&self, path: &str, body: &T) -> Result<EventStream, ClientError>
    where
        T: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Accept", "text/event-stream")
            .json(body)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let bytes_stream = response.bytes_stream();

        // Reassemble the byte stream into blank-line-delimited frames and
        // decode one typed event per frame. Decoded-but-unyielded frames
        // are carried in a queue; the remainder is flushed as a final
        // frame when the transport closes.
        let events = stream::unfold(
            (bytes_stream, FrameBuffer::new(), VecDeque::<String>::new(), false),
            |(mut bytes, mut frames, mut pending, mut done)| async move {
                loop {
                    if let Some(frame) = pending.pop_front() {
                        match decode_frame(&frame) {
                            Some(item) => return Some((item, (bytes, frames, pending, done))),
                            // Frame had no data line; silently skip it.
                            None => continue,
                        }
                    }

                    if done {
                        return None;
                    }

                    match bytes.next().await {
                        Some(Ok(chunk)) => {
                            pending.extend(frames.push(&chunk));
                        }
                        Some(Err(e)) => {
                            done = true;
                            return Some((
                                Err(ClientError::Http(e)),
                                (bytes, frames, pending, done),
                            ));
                        }
                        None => {
                            done = true;
                            if let Some(tail) = frames.finish() {
                                pending.push_back(tail);
                            }
                        }
                    }
                }
            },
        );

        Ok(Box::pin(events))
    }

    /// Clear the backend-side state for a session via `POST /chat/reset`.
    pub async fn reset(&self, session_id: &str) -> Result<(), ClientError> {
        let url = format!("{}/chat/reset", self.base_url);
        let body = ChatResetRequest {
            session_id: session_id.to_string(),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Probe `GET /health`.
    pub async fn health_check(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    /// Fetch the persisted transcript for a session.
    pub async fn history(&self, session_id: &str) -> Result<ChatHistoryResponse, ClientError> {
        let url = format!("{}/chat/history", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("session_id", session_id)])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// List known sessions.
    pub async fn sessions(&self) -> Result<SessionListResponse, ClientError> {
        let url = format!("{}/chat/sessions", self.base_url);
        let response = self.client.get(&url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

/// Map a non-success status to [`ClientError::Server`], capturing the body
/// text as the message.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ClientError::Server { status, message })
}

fn decode_frame(frame: &str) -> Option<Result<StreamEvent, ClientError>> {
    let raw = sse::parse_frame(frame)?;
    Some(sse::parse_event(&raw).map_err(ClientError::from))
}
