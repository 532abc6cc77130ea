//! Prompt assembly from ranked retrieval results.

use crate::search::ScoredResult;
use std::fmt::Write as _;

const INSTRUCTIONS: &str = "\
You are a helpful assistant for the team's knowledge base. Answer the question using ONLY the context below.
Be concise and helpful. If the context does not contain enough information, say so clearly and do not make anything up.
The user cannot see the context, so give a complete, summarized answer instead of listing the context entries.";

const THREAD_INSTRUCTIONS: &str = "\
This question is part of a conversation thread. Consider the history when answering: \
refer back to earlier questions and build on previous answers.";

/// Renders results as `Source/Q/A` blocks in ranked order.
pub fn render_context(results: &[ScoredResult<'_>]) -> String {
    let mut context = String::new();
    for result in results {
        let meta = result.metadata;
        // Writing to a String cannot fail.
        let _ = write!(
            context,
            "Source: {}\nQ: {}\n\nA: {}\n\n",
            meta.source, meta.question, meta.answer
        );
    }
    context
}

/// Builds the full generation prompt.
///
/// The thread-aware template is used when `thread_context` has non-blank content.
pub fn build_prompt(
    question: &str,
    results: &[ScoredResult<'_>],
    thread_context: Option<&str>,
) -> String {
    let context = render_context(results);

    match thread_context.map(str::trim).filter(|t| !t.is_empty()) {
        Some(thread) => format!(
            "{INSTRUCTIONS}\n{THREAD_INSTRUCTIONS}\n\n\
             === CONVERSATION HISTORY ===\n{thread}\n=== END CONVERSATION HISTORY ===\n\n\
             Context:\n{context}Current question: {question}\n\nAnswer:"
        ),
        None => format!("{INSTRUCTIONS}\n\nContext:\n{context}Question: {question}\n\nAnswer:"),
    }
}
