//! Transcript state and the streaming turn engine.
//!
//! One [`ChatState`] owns the transcript for a conversation. A turn pushes
//! the user's message plus an empty assistant message, then applies
//! streamed events to that assistant message until the transport closes or
//! a terminal fault occurs. Faults are converted to transcript state here;
//! none propagate to the caller.
//!
//! Single-flight is enforced with a drop guard over the stream-active
//! flag: submissions are rejected while a stream is active, so at most one
//! assistant message is ever being mutated, and the flag is released even
//! if the turn future is dropped. Cancellation is cooperative; the token
//! is checked before every mutation so a late chunk on an abandoned stream
//! can never corrupt a transcript that has already moved on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use uuid::Uuid;

use crate::client::HorizonClient;
use crate::error::ClientError;
use crate::models::{ChatStreamRequest, Message, QuizStreamRequest};
use crate::sse::StreamEvent;

/// Prefix shown on inline failure messages in the transcript.
pub const WARNING_PREFIX: &str = "\u{26a0} ";

/// Fixed notice used when a frame's payload cannot be decoded. Doubles as
/// the recorded error string for that fault.
pub const PARSE_FAILURE_NOTICE: &str = "Failed to read the streamed response.";

/// Cooperative cancellation flag shared with an in-flight turn.
///
/// Cloning yields another handle to the same flag. There is no forced
/// interruption; the turn observes the flag at its suspension points.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// How a turn ended. The transcript already reflects the outcome when this
/// is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream was consumed to completion.
    Completed,
    /// Transport, protocol, or decoding fault. Terminal for the turn; the
    /// next submission starts a fresh attempt.
    Failed,
    /// The turn's cancel token fired. No user-visible message.
    Cancelled,
    /// Rejected because another stream is active.
    Busy,
}

/// RAII handle on the single-flight flag.
///
/// The flag is cleared on drop, so it is released on every completion
/// path, including the turn future being dropped mid-stream (teardown).
#[derive(Debug)]
struct StreamGuard {
    flag: Arc<AtomicBool>,
}

impl StreamGuard {
    /// Take the flag, or `None` if a stream is already active.
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Transcript and streaming state for one conversation.
#[derive(Debug, Default)]
pub struct ChatState {
    /// Lazily created on first submit, then stable until reset.
    session_id: Option<String>,
    /// Append-only, ordered by insertion.
    messages: Vec<Message>,
    /// Single-flight guard, held via [`StreamGuard`] while a turn runs.
    stream_active: Arc<AtomicBool>,
    /// Error surfaced to the user until the next successful turn.
    stream_error: Option<String>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn stream_error(&self) -> Option<&str> {
        self.stream_error.as_deref()
    }

    pub fn is_streaming(&self) -> bool {
        self.stream_active.load(Ordering::SeqCst)
    }

    /// The session identifier, created on first use.
    pub fn session_id(&mut self) -> &str {
        self.session_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
    }

    /// Start over: clear the transcript and drop the session id so the
    /// next submit opens a new conversation. Returns the old id so the
    /// caller can reset it server-side too.
    pub fn reset_session(&mut self) -> Option<String> {
        self.messages.clear();
        self.stream_error = None;
        self.session_id.take()
    }

    /// Submit one user message and stream the assistant's reply.
    pub async fn send(&mut self, client: &HorizonClient, text: &str) -> TurnOutcome {
        self.send_with(client, text, CancelToken::new(), |_| {}).await
    }

    /// Like [`ChatState::send`], with an externally held cancel token and a
    /// callback invoked for every appended fragment.
    pub async fn send_with<F>(
        &mut self,
        client: &HorizonClient,
        text: &str,
        cancel: CancelToken,
        mut on_token: F,
    ) -> TurnOutcome
    where
        F: FnMut(&str),
    {
        let Some(guard) = StreamGuard::acquire(&self.stream_active) else {
            return TurnOutcome::Busy;
        };

        let request = ChatStreamRequest::new(self.session_id().to_string(), text);

        self.messages.push(Message::user(text));
        self.messages.push(Message::assistant_placeholder());
        let assistant = self.messages.len() - 1;

        let outcome = self
            .run_turn(client, &request, assistant, &cancel, &mut on_token)
            .await;
        drop(guard);

        if outcome == TurnOutcome::Completed {
            self.stream_error = None;
        }
        outcome
    }

    async fn run_turn<F>(
        &mut self,
        client: &HorizonClient,
        request: &ChatStreamRequest,
        assistant: usize,
        cancel: &CancelToken,
        on_token: &mut F,
    ) -> TurnOutcome
    where
        F: FnMut(&str),
    {
        let mut stream = match client.chat_stream(request).await {
            Ok(stream) => stream,
            Err(e) => {
                if cancel.is_cancelled() {
                    return TurnOutcome::Cancelled;
                }
                tracing::warn!(error = %e, "chat stream request failed");
                return self.fail_turn(assistant, &e.to_string());
            }
        };

        while let Some(item) = stream.next().await {
            // Checked before every mutation: a cancelled turn must not
            // touch the transcript again.
            if cancel.is_cancelled() {
                return TurnOutcome::Cancelled;
            }

            match item {
                Ok(StreamEvent::Token(fragment)) => {
                    if let Some(message) = self.messages.get_mut(assistant) {
                        message.text.push_str(&fragment);
                    }
                    on_token(&fragment);
                }
                Ok(StreamEvent::Error { message }) => {
                    cancel.cancel();
                    tracing::warn!(message = %message, "backend reported stream error");
                    return self.fail_turn(assistant, &message);
                }
                // Logical completion marker only; the transport closing is
                // the actual termination signal.
                Ok(StreamEvent::End) => {}
                Ok(StreamEvent::Ignored) => {}
                Err(ClientError::SseParse(e)) => {
                    cancel.cancel();
                    tracing::warn!(error = %e, "undecodable stream frame");
                    return self.fail_turn(assistant, PARSE_FAILURE_NOTICE);
                }
                Err(e) => {
                    cancel.cancel();
                    tracing::warn!(error = %e, "stream transport failure");
                    return self.fail_turn(assistant, &e.to_string());
                }
            }
        }

        // A transport close on an abandoned stream is a completion signal
        // from that stream; it is ignored like any late chunk.
        if cancel.is_cancelled() {
            return TurnOutcome::Cancelled;
        }

        TurnOutcome::Completed
    }

    /// Replace the assistant bubble with a warning and record the error
    /// for display until the next successful turn.
    fn fail_turn(&mut self, assistant: usize, message: &str) -> TurnOutcome {
        if let Some(bubble) = self.messages.get_mut(assistant) {
            bubble.text = format!("{WARNING_PREFIX}{message}");
        }
        self.stream_error = Some(message.to_string());
        TurnOutcome::Failed
    }
}

/// Drive a quiz stream to completion, invoking `on_token` per fragment.
///
/// Mirrors a chat turn's semantics without touching a transcript: the
/// cancel token is checked before every callback, faults are terminal,
/// and the error message (if any) is returned for display.
pub async fn stream_quiz<F>(
    client: &HorizonClient,
    request: &QuizStreamRequest,
    cancel: &CancelToken,
    mut on_token: F,
) -> (TurnOutcome, Option<String>)
where
    F: FnMut(&str),
{
    let mut stream = match client.quiz_stream(request).await {
        Ok(stream) => stream,
        Err(e) => {
            if cancel.is_cancelled() {
                return (TurnOutcome::Cancelled, None);
            }
            tracing::warn!(error = %e, "quiz stream request failed");
            return (TurnOutcome::Failed, Some(e.to_string()));
        }
    };

    while let Some(item) = stream.next().await {
        if cancel.is_cancelled() {
            return (TurnOutcome::Cancelled, None);
        }

        match item {
            Ok(StreamEvent::Token(fragment)) => on_token(&fragment),
            Ok(StreamEvent::Error { message }) => {
                cancel.cancel();
                return (TurnOutcome::Failed, Some(message));
            }
            Ok(StreamEvent::End) | Ok(StreamEvent::Ignored) => {}
            Err(ClientError::SseParse(e)) => {
                cancel.cancel();
                tracing::warn!(error = %e, "undecodable quiz frame");
                return (TurnOutcome::Failed, Some(PARSE_FAILURE_NOTICE.to_string()));
            }
            Err(e) => {
                cancel.cancel();
                return (TurnOutcome::Failed, Some(e.to_string()));
            }
        }
    }

    if cancel.is_cancelled() {
        return (TurnOutcome::Cancelled, None);
    }
    (TurnOutcome::Completed, None)
}
