//! Conversation message types and the chat backend interface.
//!
//! This module contains the types exchanged with the chat endpoint:
//! message roles, transcript entries, and the request envelope.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default reply length (in tokens) requested from the chat backend.
pub const DEFAULT_REPLY_LENGTH: u32 = 40;

/// Represents the role of a message in a conversation.
///
/// Serialized lowercase — `"user"` / `"assistant"` — which is the wire form
/// the chat endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the persona.
    Assistant,
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
}

impl ConversationMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request envelope for the chat endpoint.
///
/// `chat_history` holds the transcript up to, but excluding, `prompt`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Persona to converse with.
    pub id: String,
    /// Prior transcript, oldest first.
    pub chat_history: Vec<ConversationMessage>,
    /// The user's new message.
    pub prompt: String,
    /// Whether mature content is allowed.
    pub nsfw: bool,
    /// Requested reply length.
    pub length: u32,
}

impl ChatRequest {
    /// Builds a request with the default content policy and reply length.
    pub fn new(
        id: impl Into<String>,
        chat_history: Vec<ConversationMessage>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            chat_history,
            prompt: prompt.into(),
            nsfw: false,
            length: DEFAULT_REPLY_LENGTH,
        }
    }
}

/// An abstract chat backend.
///
/// Implemented by the HTTP client in production and by recording doubles
/// in tests.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends one exchange to the backend and returns the persona's reply.
    async fn send_chat(&self, request: &ChatRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&MessageRole::Assistant).expect("serializes");
        assert_eq!(json, r#""assistant""#);
        let role: MessageRole = serde_json::from_str(r#""user""#).expect("deserializes");
        assert_eq!(role, MessageRole::User);
    }

    #[test]
    fn test_chat_request_defaults() {
        let request = ChatRequest::new("p-1", vec![ConversationMessage::user("hi")], "you there?");
        assert!(!request.nsfw);
        assert_eq!(request.length, DEFAULT_REPLY_LENGTH);
        assert_eq!(request.chat_history.len(), 1);
    }

    #[test]
    fn test_chat_request_wire_shape() {
        let request = ChatRequest::new("p-1", Vec::new(), "hello");
        let json = serde_json::to_value(&request).expect("serializes");
        assert_eq!(json["id"], "p-1");
        assert_eq!(json["prompt"], "hello");
        assert_eq!(json["nsfw"], false);
        assert_eq!(json["length"], 40);
        assert!(json["chat_history"].as_array().expect("array").is_empty());
    }
}
