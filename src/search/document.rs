//! Knowledge entries and per-query scored results.

use serde::Serialize;

/// Source label used when a record carries none.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Metadata stored alongside every indexed question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub source: String,
    pub question: String,
    pub answer: String,
    /// Original input position of the record. Also the deduplication identity.
    pub qa_pair_id: usize,
    pub question_length: usize,
    pub answer_length: usize,
}

/// One knowledge entry. Built once at load time and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: String,
    tokens: Vec<String>,
    metadata: DocumentMetadata,
    lowered: LoweredFields,
}

/// Lowercased copies of the text fields, computed once for keyword matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoweredFields {
    pub(crate) question: String,
    pub(crate) answer: String,
    pub(crate) source: String,
}

impl Document {
    pub(crate) fn new(id: String, tokens: Vec<String>, metadata: DocumentMetadata) -> Self {
        let lowered = LoweredFields {
            question: metadata.question.to_lowercase(),
            answer: metadata.answer.to_lowercase(),
            source: metadata.source.to_lowercase(),
        };
        Self {
            id,
            tokens,
            metadata,
            lowered,
        }
    }

    pub(crate) fn lowered(&self) -> &LoweredFields {
        &self.lowered
    }

    /// Stable identifier, `qa_<input index>`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Tokens of the question text. Answers are never tokenized.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn question(&self) -> &str {
        &self.metadata.question
    }

    pub fn answer(&self) -> &str {
        &self.metadata.answer
    }

    pub fn source(&self) -> &str {
        &self.metadata.source
    }

    pub fn qa_pair_id(&self) -> usize {
        self.metadata.qa_pair_id
    }
}

/// A document paired with the score one of the scorers gave it.
///
/// Borrows from the index it was produced by and lives only as long as the query.
/// Similarity scores are bounded to [0, 1]; keyword scores are divided by ten
/// but can exceed 1, so only compare scores from the same strategy.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoredResult<'a> {
    /// Question text of the matched document.
    pub document: &'a str,
    pub metadata: &'a DocumentMetadata,
    pub score: f64,
}

impl<'a> ScoredResult<'a> {
    pub(crate) fn new(doc: &'a Document, score: f64) -> Self {
        Self {
            document: doc.question(),
            metadata: doc.metadata(),
            score,
        }
    }
}
