//! Data types for stored chunks and search results.

use serde::{Deserialize, Serialize};

/// A unit of ingested text, identified by its position in the document store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Position of the chunk in the store's insertion order.
    pub index: usize,
    /// The trimmed, non-empty text of the chunk.
    pub text: String,
}

/// A retrieved [`Chunk`] paired with its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query embedding (higher is more relevant).
    ///
    /// Chunks whose similarity is undefined score `f32::NEG_INFINITY`.
    pub score: f32,
}
