//! In-memory document store using brute-force cosine similarity.
//!
//! [`InMemoryDocumentStore`] keeps two parallel sequences, chunk texts and
//! their embeddings, behind a single `tokio::sync::RwLock`. Appends take the
//! write guard once for both sequences, so concurrent readers see either the
//! state before an ingest or the state after it, never a chunk without its
//! vector. Nothing is persisted; the store lives as long as its owner.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

#[derive(Debug, Default)]
struct StoreInner {
    chunks: Vec<String>,
    vectors: Vec<Vec<f32>>,
    /// Fixed by the first append.
    dimensions: Option<usize>,
}

/// An append-only, memory-resident store of chunks and embeddings.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{InMemoryDocumentStore, VectorStore};
///
/// let store = InMemoryDocumentStore::new();
/// store.append(vec!["hello".into()], vec![vec![1.0, 0.0]]).await?;
/// assert_eq!(store.len().await, 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The embedding dimension, once the first chunk has been stored.
    pub async fn dimensions(&self) -> Option<usize> {
        self.inner.read().await.dimensions
    }

    /// The chunk text and embedding stored at `index`.
    pub async fn get(&self, index: usize) -> Option<(String, Vec<f32>)> {
        let inner = self.inner.read().await;
        let text = inner.chunks.get(index)?.clone();
        let vector = inner.vectors.get(index)?.clone();
        Some((text, vector))
    }
}

fn store_error(message: String) -> RagError {
    RagError::VectorStoreError { backend: BACKEND.to_string(), message }
}

/// Compute cosine similarity between two vectors.
///
/// Returns `None` when either vector has zero (or non-finite) magnitude,
/// where the similarity is undefined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    let score = dot / denom;
    // `+ 0.0` folds -0.0 into 0.0 so `total_cmp` treats them as a tie.
    if score.is_nan() { None } else { Some(score + 0.0) }
}

#[async_trait]
impl VectorStore for InMemoryDocumentStore {
    async fn append(&self, chunks: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<usize> {
        if chunks.len() != vectors.len() {
            return Err(store_error(format!(
                "got {} chunks but {} embeddings",
                chunks.len(),
                vectors.len()
            )));
        }

        let mut inner = self.inner.write().await;
        if chunks.is_empty() {
            return Ok(inner.chunks.len());
        }

        // Validate everything before touching either sequence.
        let expected = inner.dimensions.unwrap_or(vectors[0].len());
        if expected == 0 {
            return Err(store_error("embeddings must not be empty".to_string()));
        }
        if let Some(bad) = vectors.iter().position(|v| v.len() != expected) {
            return Err(store_error(format!(
                "embedding {bad} has dimension {}, expected {expected}",
                vectors[bad].len()
            )));
        }

        inner.dimensions = Some(expected);
        inner.chunks.extend(chunks);
        inner.vectors.extend(vectors);
        debug!(total = inner.chunks.len(), dimensions = expected, "appended chunks");
        Ok(inner.chunks.len())
    }

    async fn len(&self) -> usize {
        self.inner.read().await.chunks.len()
    }

    async fn chunks(&self) -> Vec<String> {
        self.inner.read().await.chunks.clone()
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let inner = self.inner.read().await;
        if inner.chunks.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        if let Some(dimensions) = inner.dimensions {
            if embedding.len() != dimensions {
                return Err(store_error(format!(
                    "query embedding has dimension {}, expected {dimensions}",
                    embedding.len()
                )));
            }
        }

        let mut scored: Vec<SearchResult> = inner
            .chunks
            .iter()
            .zip(inner.vectors.iter())
            .enumerate()
            .map(|(index, (text, vector))| SearchResult {
                chunk: Chunk { index, text: text.clone() },
                score: cosine_similarity(embedding, vector).unwrap_or(f32::NEG_INFINITY),
            })
            .collect();

        // `sort_by` is stable, so equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}
