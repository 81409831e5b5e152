//! Generation provider trait and conversation types.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The author of a [`ConversationTurn`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// The wire name used by chat-completion APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of a conversation sent to a [`GenerationProvider`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// A hosted chat-completion model.
///
/// Maps an ordered conversation to a single, non-streamed text completion.
/// Transport, authentication and malformed-response failures are reported
/// as [`RagError::GenerationError`](crate::RagError::GenerationError); the
/// [`AnswerComposer`](crate::AnswerComposer) decides whether to mask them.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// A short name for logs, usually the model identifier.
    fn name(&self) -> &str;

    /// Complete the conversation and return the model's reply.
    async fn complete(&self, turns: &[ConversationTurn]) -> Result<String>;
}
