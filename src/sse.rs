//! SSE (Server-Sent Events) frame parsing for streamed responses.
//!
//! The backend streams `text/event-stream` bodies where each frame is
//! delimited by a blank line (two consecutive newlines) and carries
//! optional `event:` and `data:` lines:
//!
//! ```text
//! data: {"type":"token","data":"Hello"}
//!
//! event: error
//! data: {"type":"error","message":"Service offline"}
//!
//! event: end
//! data: {}
//! ```
//!
//! [`FrameBuffer`] reassembles arbitrarily fragmented byte chunks into
//! complete frames; [`parse_frame`] and [`parse_event`] turn a frame into a
//! typed [`StreamEvent`].

use serde_json::Value;
use thiserror::Error;

/// Event type assumed when a frame has no `event:` line.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// A typed event decoded from one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text fragment to append to the active assistant message.
    Token(String),
    /// Backend-reported failure. Terminal for the stream.
    Error { message: String },
    /// Logical completion marker. The transport closing is the actual
    /// termination signal, so this carries no payload.
    End,
    /// Valid JSON in an unrecognized shape, skipped for forward
    /// compatibility.
    Ignored,
}

/// Errors raised while decoding a frame's data payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SseParseError {
    /// The `data:` payload was not valid JSON.
    #[error("invalid JSON in '{event_type}' frame: {message}")]
    InvalidJson { event_type: String, message: String },
}

/// Reassembles a fragmented byte stream into blank-line-delimited frames.
///
/// Chunks may split frames, lines, or even multi-byte UTF-8 sequences at
/// any position; the buffer holds incomplete tails until enough bytes
/// arrive. The emitted frames are identical for every chunking of the same
/// byte stream.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    /// Undecoded bytes, at most one incomplete UTF-8 sequence.
    bytes: Vec<u8>,
    /// Decoded text not yet split into complete frames.
    text: String,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete frame it produced.
    ///
    /// The text after the last frame delimiter may be an in-progress frame
    /// and is retained for the next call. Frames are returned trimmed and
    /// non-empty, in stream order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.bytes.extend_from_slice(chunk);
        let decoded = self.take_decoded();
        self.text.push_str(&decoded);

        let mut frames = Vec::new();
        while let Some(pos) = self.text.find("\n\n") {
            let frame = self.text[..pos].trim().to_string();
            self.text.drain(..pos + 2);
            if !frame.is_empty() {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush the remainder as one final frame once the transport closes.
    pub fn finish(&mut self) -> Option<String> {
        if !self.bytes.is_empty() {
            // A truncated multi-byte sequence at end of stream decodes to
            // replacement characters rather than being dropped.
            let tail = String::from_utf8_lossy(&self.bytes).into_owned();
            self.text.push_str(&tail);
            self.bytes.clear();
        }
        let frame = self.text.trim().to_string();
        self.text.clear();
        if frame.is_empty() {
            None
        } else {
            Some(frame)
        }
    }

    /// Decode the longest valid UTF-8 prefix of the byte buffer, keeping an
    /// incomplete trailing sequence for the next chunk. Invalid sequences
    /// mid-stream become replacement characters.
    fn take_decoded(&mut self) -> String {
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.bytes) {
                Ok(valid) => {
                    out.push_str(valid);
                    self.bytes.clear();
                    break;
                }
                Err(err) => {
                    let valid_len = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.bytes[..valid_len]));
                    match err.error_len() {
                        Some(bad_len) => {
                            out.push('\u{FFFD}');
                            self.bytes.drain(..valid_len + bad_len);
                        }
                        None => {
                            // Incomplete sequence at the tail; wait for the
                            // next chunk.
                            self.bytes.drain(..valid_len);
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}

/// A frame reduced to its event type and data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub event_type: String,
    pub data: String,
}

/// Split a frame into its event type and data payload.
///
/// A missing `event:` line defaults the type to `"message"`. When a frame
/// carries several `data:` lines the last one wins, matching the backend's
/// framing. Frames with no `data:` line at all yield `None` and are
/// silently skipped.
pub fn parse_frame(frame: &str) -> Option<RawFrame> {
    let mut event_type: Option<String> = None;
    let mut data: Option<String> = None;

    for line in frame.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(rest) = line.strip_prefix("event:") {
            event_type = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data = Some(rest.trim().to_string());
        }
        // Comments and unknown field names are ignored.
    }

    data.map(|data| RawFrame {
        event_type: event_type.unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
        data,
    })
}

/// Decode a raw frame into a typed [`StreamEvent`].
///
/// Dispatch considers both the frame's event type and the payload's
/// structural `type` field: an `error` on either side is terminal, `end`
/// is a no-op marker, and `token` payloads carry a text fragment. Any
/// other valid-JSON shape is ignored.
pub fn parse_event(frame: &RawFrame) -> Result<StreamEvent, SseParseError> {
    let payload: Value =
        serde_json::from_str(&frame.data).map_err(|e| SseParseError::InvalidJson {
            event_type: frame.event_type.clone(),
            message: e.to_string(),
        })?;

    let kind = payload.get("type").and_then(Value::as_str);

    if frame.event_type == "error" || kind == Some("error") {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Ok(StreamEvent::Error { message });
    }

    if frame.event_type == "end" {
        return Ok(StreamEvent::End);
    }

    if kind == Some("token") {
        let data = payload
            .get("data")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Ok(StreamEvent::Token(data));
    }

    Ok(StreamEvent::Ignored)
}
