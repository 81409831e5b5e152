//! Query-time retrieval: embed the query, rank stored chunks.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Ranks stored chunks against a natural-language query.
///
/// The retriever holds shared handles to the embedding provider and the
/// store; it never writes to the store.
#[derive(Clone)]
pub struct Retriever {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    pub fn new(embedding_provider: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedding_provider, store }
    }

    /// Return up to `k` chunks ranked by descending cosine similarity.
    ///
    /// An empty store yields an empty result without calling the embedding
    /// provider.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `k == 0`, and propagates
    /// embedding and store failures unchanged.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(RagError::ConfigError("k must be at least 1".to_string()));
        }
        if self.store.is_empty().await {
            info!("no documents in knowledge base");
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedding_provider
            .embed_batch(&[query])
            .await
            .inspect_err(|e| error!(operation = "search", error = %e, "query embedding failed"))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                error!(operation = "search", "embedding provider returned no vector");
                RagError::EmbeddingError {
                    provider: self.embedding_provider.name().to_string(),
                    message: "provider returned no embedding for the query".to_string(),
                }
            })?;

        let results = self
            .store
            .search(&query_embedding, k)
            .await
            .inspect_err(|e| error!(operation = "search", error = %e, "vector store search failed"))?;

        for result in &results {
            debug!(index = result.chunk.index, score = result.score, "ranked chunk");
        }
        info!(result_count = results.len(), "found relevant chunks");

        Ok(results)
    }
}
