//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`LineChunker`] — one chunk per non-blank line (the default)
//! - [`ParagraphChunker`] — one chunk per blank-line separated paragraph

/// A strategy for splitting raw documents into chunk texts.
///
/// Implementations return trimmed, non-empty strings in document order.
pub trait Chunker: Send + Sync {
    /// Split a document into chunk texts.
    ///
    /// Returns an empty `Vec` if the document has no non-whitespace content.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text on newlines, trimming each line and discarding blank ones.
///
/// # Example
///
/// ```rust
/// use docqa_rag::{Chunker, LineChunker};
///
/// let chunks = LineChunker.chunk("  first \n\n second\n");
/// assert_eq!(chunks, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LineChunker;

impl Chunker for LineChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Splits text on blank lines, keeping each paragraph as one chunk.
///
/// Lines inside a paragraph are trimmed and joined with single spaces, so a
/// hard-wrapped paragraph embeds as one sentence run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphChunker;

impl Chunker for ParagraphChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.lines().map(str::trim) {
            if line.is_empty() {
                if !current.is_empty() {
                    chunks.push(current.join(" "));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            chunks.push(current.join(" "));
        }

        chunks
    }
}
