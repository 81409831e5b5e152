//! A scripted [`GenerationProvider`] for tests and offline runs.

use std::collections::VecDeque;

use async_trait::async_trait;
use docqa_rag::{ConversationTurn, GenerationProvider, RagError, Result};
use tokio::sync::Mutex;

/// Replays queued replies in order, repeating the last one once the queue
/// is down to a single entry. Every received conversation is recorded.
///
/// With no replies queued the mock echoes the content of the final turn.
pub struct MockLlm {
    name: String,
    replies: Mutex<VecDeque<String>>,
    failure: Option<String>,
    received: Mutex<Vec<Vec<ConversationTurn>>>,
}

impl MockLlm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Mutex::new(VecDeque::new()),
            failure: None,
            received: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.replies.get_mut().push_back(reply.into());
        self
    }

    /// Fail every call with a [`RagError::GenerationError`].
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Conversations received so far, oldest first.
    pub async fn received(&self) -> Vec<Vec<ConversationTurn>> {
        self.received.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.received.lock().await.len()
    }
}

#[async_trait]
impl GenerationProvider for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, turns: &[ConversationTurn]) -> Result<String> {
        self.received.lock().await.push(turns.to_vec());

        if let Some(message) = &self.failure {
            return Err(RagError::GenerationError {
                provider: self.name.clone(),
                message: message.clone(),
            });
        }

        let mut replies = self.replies.lock().await;
        let reply = if replies.len() > 1 { replies.pop_front() } else { replies.front().cloned() };

        Ok(reply.unwrap_or_else(|| turns.last().map(|t| t.content.clone()).unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_replies_then_repeats_last() {
        let llm = MockLlm::new("mock").with_reply("first").with_reply("second");
        let turns = [ConversationTurn::user("hi")];

        assert_eq!(llm.complete(&turns).await.unwrap(), "first");
        assert_eq!(llm.complete(&turns).await.unwrap(), "second");
        assert_eq!(llm.complete(&turns).await.unwrap(), "second");
        assert_eq!(llm.call_count().await, 3);
    }

    #[tokio::test]
    async fn echoes_final_turn_without_replies() {
        let llm = MockLlm::new("mock");
        let turns = [ConversationTurn::user("one"), ConversationTurn::assistant("two")];

        assert_eq!(llm.complete(&turns).await.unwrap(), "two");
        assert_eq!(llm.received().await, vec![turns.to_vec()]);
    }

    #[tokio::test]
    async fn failing_mock_reports_generation_error() {
        let llm = MockLlm::new("mock").failing("quota exceeded");
        let err = llm.complete(&[ConversationTurn::user("hi")]).await.unwrap_err();

        assert!(matches!(err, RagError::GenerationError { ref message, .. } if message == "quota exceeded"));
        assert_eq!(llm.call_count().await, 1);
    }
}
