//! Knowledge base statistics handler.

use super::excerpt;
use crate::knowledge::KnowledgeBase;
use crate::search::{CorpusIndex, Document};
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

const PREVIEW_QUESTION_CHARS: usize = 100;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct StatsRequest {
    /// Also list the first N indexed Q&A pairs (default: 0)
    #[serde(default)]
    pub preview: Option<usize>,
}

pub async fn handle_knowledge_stats(
    kb: &KnowledgeBase,
    request: StatsRequest,
) -> Result<String, String> {
    let index = kb
        .index()
        .await
        .map_err(|e| format!("Knowledge base unavailable: {}", e))?;

    let mut output = format_stats(&kb.source_description(), &index);
    let preview = request.preview.unwrap_or(0);
    if preview > 0 {
        output.push('\n');
        output.push_str(&format_preview(index.preview(preview)));
    }
    Ok(output)
}

pub fn format_stats(source: &str, index: &CorpusIndex) -> String {
    let stats = index.stats();
    let mut output = String::from("Knowledge base statistics:\n\n");
    let _ = writeln!(output, "• Corpus: {}", source);
    let _ = writeln!(output, "• Records read: {}", stats.records_read);
    let _ = writeln!(output, "• Q&A pairs indexed: {}", stats.documents);
    let _ = writeln!(output, "• Records skipped: {}", stats.skipped);
    let _ = writeln!(output, "• Unique sources: {}", stats.unique_sources);
    output
}

pub fn format_preview(documents: &[Document]) -> String {
    if documents.is_empty() {
        return "The knowledge base is empty.\n".to_string();
    }

    let mut output = format!("First {} Q&A pairs:\n\n", documents.len());
    for doc in documents {
        let _ = writeln!(
            output,
            "{} [{}] {}",
            doc.id(),
            doc.source(),
            excerpt(doc.question(), PREVIEW_QUESTION_CHARS)
        );
    }
    output
}
