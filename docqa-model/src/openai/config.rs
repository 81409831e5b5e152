//! Configuration for [`OpenAICompatibleClient`](super::OpenAICompatibleClient).

use std::time::Duration;

use docqa_rag::{RagError, Result};

/// Together AI's OpenAI-compatible API base.
pub const TOGETHER_API_BASE: &str = "https://api.together.xyz/v1";

/// The model used when none is configured.
pub const DEFAULT_CHAT_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free";

/// Environment variable holding the Together AI key.
pub const TOGETHER_API_KEY_ENV: &str = "TOGETHER_API_KEY";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection and sampling settings for a chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Sent only when set; the server default applies otherwise.
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Client-side bound on a single HTTP request.
    pub timeout: Duration,
}

impl ChatConfig {
    /// A config for `model` on Together AI.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: TOGETHER_API_BASE.to_string(),
            temperature: None,
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// A config for the default Llama model on Together AI.
    pub fn together(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_CHAT_MODEL)
    }

    /// Read the API key from `TOGETHER_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(TOGETHER_API_KEY_ENV).map_err(|_| {
            RagError::ConfigError(format!("{TOGETHER_API_KEY_ENV} environment variable not set"))
        })?;
        Ok(Self::together(api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
