//! Error types for backend communication.

use thiserror::Error;

use crate::sse::SseParseError;

/// Errors surfaced by [`crate::client::HorizonClient`] operations.
///
/// Every fault is terminal for the current turn; the session layer converts
/// them to transcript state rather than retrying.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request could not be sent or the transport failed mid-stream.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A frame's data payload could not be decoded.
    #[error("SSE parse error: {0}")]
    SseParse(#[from] SseParseError),

    /// A JSON response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = ClientError::Server {
            status: 503,
            message: "overloaded".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("503"));
        assert!(display.contains("overloaded"));
    }

    #[test]
    fn test_sse_parse_error_converts() {
        let parse = SseParseError::InvalidJson {
            event_type: "message".to_string(),
            message: "expected value".to_string(),
        };
        let err: ClientError = parse.into();
        assert!(matches!(err, ClientError::SseParse(_)));
    }
}
