//! Configuration for retrieval and answer composition.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Number of chunks retrieved to ground an answer.
    pub top_k: usize,
    /// Completions with fewer whitespace-separated words are replaced by an apology.
    pub min_answer_words: usize,
    /// Upper bound on a single generation call; exceeding it counts as a failure.
    pub generation_timeout: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { top_k: 3, min_answer_words: 5, generation_timeout: Duration::from_secs(60) }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the number of chunks retrieved per answer.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum word count for an accepted completion.
    pub fn min_answer_words(mut self, words: usize) -> Self {
        self.config.min_answer_words = words;
        self
    }

    /// Set the timeout applied to each generation call.
    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.config.generation_timeout = timeout;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `top_k == 0`
    /// - `generation_timeout` is zero
    pub fn build(self) -> Result<RagConfig> {
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.config.generation_timeout.is_zero() {
            return Err(RagError::ConfigError(
                "generation_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
