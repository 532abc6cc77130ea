//! Ranked retrieval handler.

use super::excerpt;
use crate::assistant::AssistantSettings;
use crate::knowledge::KnowledgeBase;
use crate::search::ScoredResult;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

/// Answer text shown per hit.
const ANSWER_EXCERPT_CHARS: usize = 240;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Free-text query
    pub query: String,
    /// Maximum number of results to return (default: configured k)
    #[serde(default)]
    pub limit: Option<usize>,
    /// Minimum similarity score between 0 and 1 (default: configured threshold)
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Runs a fused search and formats the hits.
pub async fn handle_search(
    kb: &KnowledgeBase,
    defaults: &AssistantSettings,
    request: SearchRequest,
) -> Result<String, String> {
    let limit = request.limit.unwrap_or(defaults.k);
    if limit == 0 {
        return Err("limit must be at least 1".to_string());
    }
    let threshold = request.threshold.unwrap_or(defaults.threshold);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(format!("threshold must be between 0 and 1, got {}", threshold));
    }

    let index = kb
        .index()
        .await
        .map_err(|e| format!("Knowledge base unavailable: {}", e))?;

    let results = index.search(&request.query, limit, threshold);
    if results.is_empty() {
        return Ok(format!(
            "No results found for '{}'.\n\n\
             Search tips:\n\
             • Use the words you would expect in the question itself\n\
             • Try a lower threshold to widen the similarity match\n",
            request.query
        ));
    }

    Ok(format_search_results(&results, &request.query))
}

/// Formats hits as a numbered list, best first.
pub fn format_search_results(results: &[ScoredResult<'_>], query: &str) -> String {
    let mut output = format!("Search results for '{}':\n\n", query);

    for (idx, result) in results.iter().enumerate() {
        let meta = result.metadata;
        let _ = writeln!(
            output,
            "{}. {} [{}] - score: {:.3}",
            idx + 1,
            meta.question,
            meta.source,
            result.score
        );
        let _ = writeln!(output, "   {}", excerpt(&meta.answer, ANSWER_EXCERPT_CHARS));
        output.push('\n');
    }

    output
}
