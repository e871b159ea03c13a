//! Chat session with a chosen persona.

use std::sync::Arc;

use cameo_core::conversation::{ChatBackend, ChatRequest, ConversationMessage};
use cameo_core::error::Result;
use tokio::sync::Mutex;

/// One conversation with one persona.
///
/// Owns the growing transcript and the backend handle. The transcript sent
/// with each request covers everything up to, but excluding, the new
/// prompt; the backend sees the prompt in its own field.
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    persona_id: String,
    transcript: Arc<Mutex<Vec<ConversationMessage>>>,
}

impl ChatSession {
    /// Starts an empty session with the given persona.
    pub fn new(backend: Arc<dyn ChatBackend>, persona_id: impl Into<String>) -> Self {
        Self {
            backend,
            persona_id: persona_id.into(),
            transcript: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sends one message and returns the persona's reply.
    ///
    /// The user message joins the transcript before the call, so a failed
    /// exchange keeps what the user typed; only the reply is missing. The
    /// error propagates for the surface to display.
    pub async fn send(&self, prompt: &str) -> Result<String> {
        let prior = {
            let mut transcript = self.transcript.lock().await;
            let prior = transcript.clone();
            transcript.push(ConversationMessage::user(prompt));
            prior
        };

        let request = ChatRequest::new(&self.persona_id, prior, prompt);
        let reply = self.backend.send_chat(&request).await?;

        self.transcript
            .lock()
            .await
            .push(ConversationMessage::assistant(&reply));
        Ok(reply)
    }

    /// A snapshot of the transcript, oldest first.
    pub async fn history(&self) -> Vec<ConversationMessage> {
        self.transcript.lock().await.clone()
    }

    /// The persona this session talks to.
    pub fn persona_id(&self) -> &str {
        &self.persona_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cameo_core::CameoError;
    use cameo_core::conversation::MessageRole;

    /// Chat backend double that records requests and replays scripted
    /// responses.
    struct RecordingBackend {
        requests: Mutex<Vec<ChatRequest>>,
        responses: Mutex<Vec<Result<String>>>,
    }

    impl RecordingBackend {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                responses: Mutex::new(responses),
            }
        }

        async fn last_request(&self) -> Option<ChatRequest> {
            self.requests.lock().await.last().cloned()
        }
    }

    #[async_trait::async_trait]
    impl ChatBackend for RecordingBackend {
        async fn send_chat(&self, request: &ChatRequest) -> Result<String> {
            self.requests.lock().await.push(request.clone());
            self.responses.lock().await.remove(0)
        }
    }

    #[tokio::test]
    async fn send_grows_transcript_with_both_sides() {
        let backend = Arc::new(RecordingBackend::new(vec![Ok("Hello there!".to_string())]));
        let session = ChatSession::new(backend, "p-1");

        let reply = session.send("hi").await.expect("reply");
        assert_eq!(reply, "Hello there!");

        let history = session.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].content, "hi");
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].content, "Hello there!");
    }

    #[tokio::test]
    async fn request_history_excludes_the_new_prompt() {
        let backend = Arc::new(RecordingBackend::new(vec![
            Ok("first".to_string()),
            Ok("second".to_string()),
        ]));
        let session = ChatSession::new(backend.clone(), "p-1");

        session.send("one").await.expect("reply");
        session.send("two").await.expect("reply");

        let request = backend.last_request().await.expect("request recorded");
        assert_eq!(request.prompt, "two");
        // History carries the first exchange only, not the prompt in flight.
        assert_eq!(request.chat_history.len(), 2);
        assert_eq!(request.chat_history[0].content, "one");
        assert_eq!(request.chat_history[1].content, "first");
        assert_eq!(request.id, "p-1");
    }

    #[tokio::test]
    async fn failed_send_keeps_the_user_message() {
        let backend = Arc::new(RecordingBackend::new(vec![
            Err(CameoError::transport("connection refused")),
            Ok("better now".to_string()),
        ]));
        let session = ChatSession::new(backend, "p-1");

        let err = session.send("anyone home?").await.expect_err("should fail");
        assert!(err.is_transport());

        let history = session.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "anyone home?");

        // The next exchange works and sees the stranded message as history.
        let reply = session.send("hello again").await.expect("reply");
        assert_eq!(reply, "better now");
        assert_eq!(session.history().await.len(), 3);
    }
}
