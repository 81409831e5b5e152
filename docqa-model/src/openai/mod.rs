//! Chat client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Defaults target Together AI, which hosts the Llama models this service is
//! tuned for. Any server implementing the OpenAI chat request shape works
//! once `base_url` is changed.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_model::openai::{ChatConfig, OpenAICompatibleClient};
//!
//! let client = OpenAICompatibleClient::new(
//!     ChatConfig::together(std::env::var("TOGETHER_API_KEY")?)
//!         .with_temperature(0.2)
//!         .with_max_tokens(512),
//! )?;
//! ```

mod client;
mod config;

pub use client::OpenAICompatibleClient;
pub use config::{ChatConfig, DEFAULT_CHAT_MODEL, TOGETHER_API_BASE};
