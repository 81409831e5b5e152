//! Fixed response strings and the grounded prompt template.

/// Returned when retrieval finds nothing to ground an answer on.
pub const INSUFFICIENT_INFORMATION: &str =
    "I don't have enough information to answer this question.";

/// Returned when the model's completion is too short to be useful.
pub const LOW_QUALITY_APOLOGY: &str =
    "I apologize, but I couldn't generate a proper response. Please try rephrasing your question.";

/// Returned when the generation provider fails or times out.
pub const GENERATION_ERROR_APOLOGY: &str =
    "I apologize, but I encountered an error while generating the response.";

/// Sentence the model is told to emit when the context does not cover the question.
pub const MODEL_FALLBACK_SENTENCE: &str =
    "I don't have enough information to answer this question. Please provide more details.";

/// Join retrieved chunk texts, in ranked order, into one context block.
pub fn build_context<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n")
}

/// Build the single user message that asks the model to answer `query`
/// from `context` alone.
pub fn build_grounded_prompt(context: &str, query: &str) -> String {
    format!(
        "You are a helpful AI assistant. Provide accurate and concise answers based solely on the provided information.\n\n\
         Context:\n{context}\n\n\
         Question: {query}\n\n\
         Instructions:\n\
         - Answer directly using only the relevant information from the context.\n\
         - Use a friendly and professional tone.\n\
         - Format the answer clearly:\n  \
         - For lists, use numbered items or bullet points.\n  \
         - For explanations, keep them brief and structured.\n\
         - If the context lacks sufficient information, respond: '{MODEL_FALLBACK_SENTENCE}'\n\
         Answer:"
    )
}

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
