//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] owns the document store for its whole lifetime and
//! coordinates ingestion (chunk → embed → append) and answering
//! (retrieve → prompt → generate → post-process).
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_rag::{RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .generation_provider(Arc::new(my_llm))
//!     .build()?;
//!
//! pipeline.ingest(&["Paris is the capital of France."]).await?;
//! let answer = pipeline.answer("What is the capital of France?").await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{Chunker, LineChunker};
use crate::composer::AnswerComposer;
use crate::config::RagConfig;
use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{ConversationTurn, GenerationProvider};
use crate::inmemory::InMemoryDocumentStore;
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// The RAG pipeline orchestrator.
///
/// Construct one via [`RagPipeline::builder()`]. Cloning is cheap and shares
/// the same store.
#[derive(Clone)]
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
    retriever: Retriever,
    composer: AnswerComposer,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Number of chunks currently stored.
    pub async fn chunk_count(&self) -> usize {
        self.vector_store.len().await
    }

    /// Ingest raw documents: chunk → embed (one batch) → append.
    ///
    /// Returns the number of chunks added. Either every chunk is stored or,
    /// on failure, none is.
    ///
    /// # Errors
    ///
    /// Returns the embedding provider's error if the batch cannot be
    /// embedded, [`RagError::EmbeddingError`] if it returns the wrong number
    /// of vectors, and the store's error if the append is rejected.
    pub async fn ingest<S: AsRef<str>>(&self, documents: &[S]) -> Result<usize> {
        let chunks: Vec<String> =
            documents.iter().flat_map(|doc| self.chunker.chunk(doc.as_ref())).collect();
        if chunks.is_empty() {
            info!(documents = documents.len(), chunk_count = 0, "ingested documents (empty)");
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let vectors = self.embedding_provider.embed_batch(&texts).await.inspect_err(|e| {
            error!(operation = "ingest", chunk_count = chunks.len(), error = %e, "embedding failed");
        })?;

        if vectors.len() != chunks.len() {
            error!(
                operation = "ingest",
                expected = chunks.len(),
                actual = vectors.len(),
                "embedding count mismatch"
            );
            return Err(RagError::EmbeddingError {
                provider: self.embedding_provider.name().to_string(),
                message: format!(
                    "expected {} embeddings, provider returned {}",
                    chunks.len(),
                    vectors.len()
                ),
            });
        }

        let added = chunks.len();
        let total = self.vector_store.append(chunks, vectors).await.inspect_err(|e| {
            error!(operation = "ingest", error = %e, "append failed");
        })?;

        info!(documents = documents.len(), chunk_count = added, total, "ingested documents");
        Ok(added)
    }

    /// Return up to `k` stored chunks ranked against `query`.
    ///
    /// # Errors
    ///
    /// See [`Retriever::search`].
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        self.retriever.search(query, k).await
    }

    /// Answer `query` grounded in the top `config.top_k` chunks.
    ///
    /// # Errors
    ///
    /// See [`AnswerComposer::answer`].
    pub async fn answer(&self, query: &str) -> Result<String> {
        self.composer.answer(query).await
    }

    /// Send a caller-supplied conversation directly to the generation provider.
    pub async fn answer_with_history(&self, turns: &[ConversationTurn]) -> String {
        self.composer.answer_with_history(turns).await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// The embedding and generation providers are required. The store defaults
/// to a fresh [`InMemoryDocumentStore`], the chunker to [`LineChunker`] and
/// the config to [`RagConfig::default()`].
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the generation provider.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a provider is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let generation_provider = self
            .generation_provider
            .ok_or_else(|| RagError::ConfigError("generation_provider is required".to_string()))?;
        let vector_store: Arc<dyn VectorStore> = match self.vector_store {
            Some(store) => store,
            None => Arc::new(InMemoryDocumentStore::new()),
        };
        let chunker: Arc<dyn Chunker> = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(LineChunker),
        };

        let retriever = Retriever::new(embedding_provider.clone(), vector_store.clone());
        let composer = AnswerComposer::new(config.clone(), retriever.clone(), generation_provider);

        Ok(RagPipeline { config, embedding_provider, vector_store, chunker, retriever, composer })
    }
}
