//! # docqa-model
//!
//! Chat-completion clients implementing
//! [`GenerationProvider`](docqa_rag::GenerationProvider).
//!
//! ## Overview
//!
//! - [`OpenAICompatibleClient`] - any `/chat/completions` API (Together AI by default)
//! - [`MockLlm`] - scripted model for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docqa_model::openai::{ChatConfig, OpenAICompatibleClient};
//!
//! let model = OpenAICompatibleClient::new(ChatConfig::from_env()?)?;
//! ```
//!
//! ## Supported Models
//!
//! | Model | Description |
//! |-------|-------------|
//! | `meta-llama/Llama-3.3-70B-Instruct-Turbo-Free` | Default, free tier on Together AI |
//! | `mistralai/Mixtral-8x7B-Instruct-v0.1` | Smaller, faster alternative |

pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

pub use mock::MockLlm;
#[cfg(feature = "openai")]
pub use openai::{ChatConfig, OpenAICompatibleClient};
