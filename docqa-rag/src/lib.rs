//! # docqa-rag
//!
//! Retrieval-augmented question answering over an in-memory document store.
//!
//! ## Overview
//!
//! Documents are split into chunks, embedded in one batch per ingest, and
//! appended to an [`InMemoryDocumentStore`]. A query is embedded, compared to
//! every stored vector by cosine similarity, and the best chunks are placed
//! into a fixed prompt for a [`GenerationProvider`]. The
//! [`AnswerComposer`] masks generation failures and degenerate completions
//! with fixed apologies; embedding failures are returned to the caller.
//!
//! ## Features
//!
//! - `openai` — [`openai::OpenAIEmbeddingProvider`] for OpenAI-compatible APIs
//! - `fastembed` — [`local::FastEmbedProvider`] running `all-MiniLM-L6-v2` locally
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_rag::{RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .generation_provider(Arc::new(llm))
//!     .build()?;
//!
//! pipeline.ingest(&[document_text]).await?;
//! let answer = pipeline.answer("What is Paris known for?").await?;
//! ```

pub mod chunking;
pub mod composer;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod inmemory;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod vectorstore;

#[cfg(feature = "fastembed")]
pub mod local;
#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{Chunker, LineChunker, ParagraphChunker};
pub use composer::AnswerComposer;
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::{ConversationTurn, GenerationProvider, Role};
pub use inmemory::{InMemoryDocumentStore, cosine_similarity};
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use retriever::Retriever;
pub use vectorstore::VectorStore;
