//! Transcript models and wire types for the Horizon backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One transcript entry.
///
/// User messages are finalized on submit; the assistant message for the
/// same turn starts empty and is appended to while its stream is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Opaque client-side identifier.
    pub id: String,
    pub role: Role,
    /// Accumulated text. Pure append during streaming.
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            text: text.into(),
        }
    }

    /// Empty assistant message to stream into.
    pub fn assistant_placeholder() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            text: String::new(),
        }
    }
}

/// Body for `POST /chat/stream`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatStreamRequest {
    /// Identifier correlating all turns of one conversation.
    pub session_id: String,
    /// The user's literal message text.
    pub message: String,
    /// Optional context to ground the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Arbitrary key-value pairs forwarded to the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ChatStreamRequest {
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            message: message.into(),
            context: None,
            metadata: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Body for `POST /chat/reset`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResetRequest {
    pub session_id: String,
}

/// One persisted entry from `GET /chat/history`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Response of `GET /chat/history?session_id=<id>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatHistoryResponse {
    pub session_id: String,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// One entry from `GET /chat/sessions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub updated_at: DateTime<Utc>,
    pub message_count: u32,
}

/// Response of `GET /chat/sessions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionListResponse {
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

/// Body for `POST /quiz/stream`. Same response wire format as chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizStreamRequest {
    pub session_id: String,
    /// Subject area the quiz should cover.
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    pub num_questions: u8,
}

impl QuizStreamRequest {
    pub fn new(session_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            topic: topic.into(),
            difficulty: None,
            num_questions: 5,
        }
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_message_constructors() {
        let user = Message::user("hi");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.text, "hi");
        assert!(!user.id.is_empty());

        let assistant = Message::assistant_placeholder();
        assert_eq!(assistant.role, Role::Assistant);
        assert!(assistant.text.is_empty());
    }

    #[test]
    fn test_chat_stream_request_omits_empty_options() {
        let request = ChatStreamRequest::new("sess-1", "hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["session_id"], "sess-1");
        assert_eq!(json["message"], "hello");
        assert!(json.get("context").is_none());
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_chat_stream_request_with_context() {
        let request = ChatStreamRequest::new("sess-1", "hello").with_context("week 3 slides");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["context"], "week 3 slides");
    }

    #[test]
    fn test_history_response_defaults_messages() {
        let payload = "{\"session_id\":\"s\"}";
        let history: ChatHistoryResponse = serde_json::from_str(payload).unwrap();
        assert!(history.messages.is_empty());
    }

    #[test]
    fn test_quiz_request_defaults() {
        let request = QuizStreamRequest::new("sess-1", "sorting algorithms");
        assert_eq!(request.num_questions, 5);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("difficulty").is_none());
        assert_eq!(json["topic"], "sorting algorithms");
    }
}
