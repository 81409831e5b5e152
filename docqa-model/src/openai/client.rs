//! OpenAI-compatible chat client.

use async_trait::async_trait;
use docqa_rag::{ConversationTurn, GenerationProvider, RagError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::config::ChatConfig;

const PROVIDER: &str = "OpenAICompatible";

/// Sends a conversation to `{base_url}/chat/completions` and returns the
/// first choice's message content, trimmed.
pub struct OpenAICompatibleClient {
    client: reqwest::Client,
    config: ChatConfig,
}

impl OpenAICompatibleClient {
    /// Create a new client.
    pub fn new(config: ChatConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(RagError::ConfigError("chat API key must not be empty".into()));
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build().map_err(|e| {
            RagError::GenerationError {
                provider: PROVIDER.into(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn failure(message: String) -> RagError {
        RagError::GenerationError { provider: PROVIDER.into(), message }
    }
}

// ── Chat completion request/response types ─────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl GenerationProvider for OpenAICompatibleClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, turns: &[ConversationTurn]) -> Result<String> {
        debug!(model = %self.config.model, turn_count = turns.len(), "requesting chat completion");

        let request = ChatRequest {
            model: &self.config.model,
            messages: turns
                .iter()
                .map(|turn| ChatMessage { role: turn.role.as_str(), content: &turn.content })
                .collect(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                Self::failure(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(Self::failure(format!("API returned {status}: {detail}")));
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            Self::failure(format!("failed to parse response: {e}"))
        })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Self::failure("response contained no choices".into()))?;
        choice
            .message
            .content
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Self::failure("response choice had no content".into()))
    }
}
