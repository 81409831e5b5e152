//! Server configuration read from the environment.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use docqa_model::openai::{DEFAULT_CHAT_MODEL, TOGETHER_API_BASE};
use docqa_rag::RagConfig;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-base-en-v1.5";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 768;
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("unknown log format '{other}', expected text or json"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChunkingStrategy {
    #[default]
    Line,
    Paragraph,
}

impl FromStr for ChunkingStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "paragraph" => Ok(Self::Paragraph),
            other => bail!("unknown chunking strategy '{other}', expected line or paragraph"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// An OpenAI-compatible `/embeddings` API.
    #[default]
    Remote,
    /// `all-MiniLM-L6-v2` in-process; needs the `local-embeddings` feature.
    Local,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            other => bail!("unknown embedding backend '{other}', expected remote or local"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    /// Per-request bound for the remote backend.
    pub timeout: Duration,
    pub api_key: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ChatSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub log_format: LogFormat,
    pub chunking: ChunkingStrategy,
    pub rag: RagConfig,
    pub embedding: EmbeddingSettings,
    pub chat: ChatSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_format: LogFormat::Text,
            chunking: ChunkingStrategy::Line,
            rag: RagConfig::default(),
            embedding: EmbeddingSettings {
                backend: EmbeddingBackend::Remote,
                base_url: TOGETHER_API_BASE.to_string(),
                model: DEFAULT_EMBEDDING_MODEL.to_string(),
                dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
                timeout: DEFAULT_EMBEDDING_TIMEOUT,
                api_key: None,
            },
            chat: ChatSettings {
                base_url: TOGETHER_API_BASE.to_string(),
                model: DEFAULT_CHAT_MODEL.to_string(),
                api_key: None,
            },
        }
    }
}

impl ServerConfig {
    /// Load `.env` if present, then read `DOCQA_*` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("DOCQA_HOST") {
            config.host = host;
        }
        if let Some(port) = get("DOCQA_PORT") {
            config.port = port.trim().parse().with_context(|| format!("invalid DOCQA_PORT '{port}'"))?;
        }
        if let Some(limit) = get("DOCQA_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = limit
                .trim()
                .parse()
                .with_context(|| format!("invalid DOCQA_MAX_UPLOAD_BYTES '{limit}'"))?;
        }
        if let Some(format) = get("DOCQA_LOG_FORMAT") {
            config.log_format = format.parse()?;
        }
        if let Some(chunking) = get("DOCQA_CHUNKING") {
            config.chunking = chunking.parse()?;
        }
        if let Some(top_k) = get("DOCQA_TOP_K") {
            let top_k: usize =
                top_k.trim().parse().with_context(|| format!("invalid DOCQA_TOP_K '{top_k}'"))?;
            config.rag = RagConfig::builder().top_k(top_k).build()?;
        }

        if let Some(backend) = get("DOCQA_EMBEDDING_BACKEND") {
            config.embedding.backend = backend.parse()?;
        }
        if let Some(base_url) = get("DOCQA_EMBEDDING_BASE_URL") {
            config.embedding.base_url = base_url;
        }
        if let Some(model) = get("DOCQA_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Some(dimensions) = get("DOCQA_EMBEDDING_DIMENSIONS") {
            config.embedding.dimensions = dimensions
                .trim()
                .parse()
                .with_context(|| format!("invalid DOCQA_EMBEDDING_DIMENSIONS '{dimensions}'"))?;
        }
        if let Some(secs) = get("DOCQA_EMBEDDING_TIMEOUT") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("invalid DOCQA_EMBEDDING_TIMEOUT '{secs}'"))?;
            if secs == 0 {
                bail!("DOCQA_EMBEDDING_TIMEOUT must be greater than zero");
            }
            config.embedding.timeout = Duration::from_secs(secs);
        }
        config.embedding.api_key =
            get("DOCQA_EMBEDDING_API_KEY").or_else(|| get("TOGETHER_API_KEY"));

        if let Some(base_url) = get("DOCQA_CHAT_BASE_URL") {
            config.chat.base_url = base_url;
        }
        if let Some(model) = get("DOCQA_CHAT_MODEL") {
            config.chat.model = model;
        }
        config.chat.api_key = get("TOGETHER_API_KEY");

        Ok(config)
    }
}
