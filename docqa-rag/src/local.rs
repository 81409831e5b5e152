//! Local sentence embeddings via `fastembed` (ONNX Runtime).
//!
//! This module is only available when the `fastembed` feature is enabled.
//! The default model is `all-MiniLM-L6-v2`, downloaded into the fastembed
//! cache on first use.

use std::sync::Arc;

use async_trait::async_trait;
use ::fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::{error, info};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "FastEmbed";

/// Output dimension of `all-MiniLM-L6-v2`.
const MINILM_DIMENSIONS: usize = 384;

/// An [`EmbeddingProvider`] that runs a sentence-embedding model in-process.
///
/// Inference is CPU-bound, so batches run on tokio's blocking pool.
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    dimensions: usize,
}

impl FastEmbedProvider {
    /// Load `all-MiniLM-L6-v2`.
    pub fn new() -> Result<Self> {
        Self::with_model(EmbeddingModel::AllMiniLML6V2, MINILM_DIMENSIONS)
    }

    /// Load another fastembed model whose output dimension is `dimensions`.
    pub fn with_model(model_name: EmbeddingModel, dimensions: usize) -> Result<Self> {
        info!(provider = PROVIDER, model = ?model_name, "initializing embedding model");
        let options = InitOptions {
            model_name,
            show_download_progress: false,
            ..Default::default()
        };
        let model = TextEmbedding::try_new(options).map_err(|e| {
            error!(provider = PROVIDER, error = %e, "model initialization failed");
            RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!("failed to initialize model: {e}"),
            }
        })?;
        Ok(Self { model: Arc::new(model), dimensions })
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text]).await?.into_iter().next().ok_or_else(|| {
            RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: "model returned no embedding".into(),
            }
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let result = tokio::task::spawn_blocking(move || model.embed(owned, None))
            .await
            .map_err(|e| RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: format!("embedding task failed: {e}"),
            })?;

        result.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "inference failed");
            RagError::EmbeddingError { provider: PROVIDER.into(), message: e.to_string() }
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
