//! Vector store trait for storing and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::SearchResult;
use crate::error::Result;

/// An append-only storage backend for chunk texts and their embeddings.
///
/// Implementations keep chunk `i` and vector `i` paired: a reader must never
/// observe a chunk without its embedding. The brute-force
/// [`InMemoryDocumentStore`](crate::InMemoryDocumentStore) is the default;
/// an approximate nearest-neighbour index can be substituted behind the same
/// contract.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{InMemoryDocumentStore, VectorStore};
///
/// let store = InMemoryDocumentStore::new();
/// store.append(chunks, vectors).await?;
/// let results = store.search(&query_embedding, 3).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append chunk texts with their embeddings, all or nothing.
    ///
    /// `chunks` and `vectors` must have the same length. Returns the number
    /// of chunks held after the append.
    async fn append(&self, chunks: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<usize>;

    /// Number of stored chunks.
    async fn len(&self) -> usize;

    /// Whether the store holds no chunks.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of all stored chunk texts in insertion order.
    async fn chunks(&self) -> Vec<String>;

    /// Return up to `top_k` chunks ordered by descending similarity to
    /// `embedding`, ties broken by insertion order.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;
}
