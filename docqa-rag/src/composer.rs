//! Answer composition: retrieve, prompt, generate, post-process.
//!
//! Generation failures never escape this module: a failed or timed-out
//! completion becomes [`GENERATION_ERROR_APOLOGY`], and a completion shorter
//! than the configured word count becomes [`LOW_QUALITY_APOLOGY`]. Retrieval
//! failures (which mean the embedding backend is down) still propagate.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::generation::{ConversationTurn, GenerationProvider};
use crate::prompt::{
    GENERATION_ERROR_APOLOGY, INSUFFICIENT_INFORMATION, LOW_QUALITY_APOLOGY, build_context,
    build_grounded_prompt, word_count,
};
use crate::retriever::Retriever;

/// Builds grounded prompts and turns model completions into user-facing answers.
#[derive(Clone)]
pub struct AnswerComposer {
    config: RagConfig,
    retriever: Retriever,
    generation_provider: Arc<dyn GenerationProvider>,
}

impl AnswerComposer {
    pub fn new(
        config: RagConfig,
        retriever: Retriever,
        generation_provider: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self { config, retriever, generation_provider }
    }

    /// Answer `query` from the top retrieved chunks.
    ///
    /// # Errors
    ///
    /// Returns the retriever's error if the query cannot be embedded or the
    /// store cannot be searched. Generation problems are answered with a
    /// fixed apology instead.
    pub async fn answer(&self, query: &str) -> Result<String> {
        let results = self.retriever.search(query, self.config.top_k).await?;
        if results.is_empty() {
            return Ok(INSUFFICIENT_INFORMATION.to_string());
        }

        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        let prompt = build_grounded_prompt(&build_context(&texts), query);
        debug!(prompt = %prompt, "prompt sent to model");

        let turns = [ConversationTurn::user(prompt)];
        let completion = match self.generate(&turns).await {
            Ok(completion) => completion,
            Err(e) => {
                error!(operation = "answer", error = %e, "generation failed");
                return Ok(GENERATION_ERROR_APOLOGY.to_string());
            }
        };

        let completion = completion.trim();
        let words = word_count(completion);
        if words < self.config.min_answer_words {
            warn!(words, min = self.config.min_answer_words, "discarding short completion");
            return Ok(LOW_QUALITY_APOLOGY.to_string());
        }

        info!(chunks = results.len(), words, "answered query");
        Ok(completion.to_string())
    }

    /// Forward a caller-supplied conversation straight to the model, without
    /// retrieval or prompt augmentation.
    pub async fn answer_with_history(&self, turns: &[ConversationTurn]) -> String {
        if turns.is_empty() {
            warn!("empty conversation history");
            return LOW_QUALITY_APOLOGY.to_string();
        }

        match self.generate(turns).await {
            Ok(completion) => completion.trim().to_string(),
            Err(e) => {
                error!(operation = "answer_with_history", error = %e, "generation failed");
                GENERATION_ERROR_APOLOGY.to_string()
            }
        }
    }

    async fn generate(&self, turns: &[ConversationTurn]) -> Result<String> {
        let timeout = self.config.generation_timeout;
        match tokio::time::timeout(timeout, self.generation_provider.complete(turns)).await {
            Ok(result) => result,
            Err(_) => Err(RagError::GenerationError {
                provider: self.generation_provider.name().to_string(),
                message: format!("no completion within {timeout:?}"),
            }),
        }
    }
}
