//! In-memory corpus index and the two single-strategy searches.

use crate::corpus::CorpusRecord;
use ahash::AHashSet;
use serde::Serialize;

use super::document::{Document, DocumentMetadata, ScoredResult, UNKNOWN_SOURCE};
use super::scoring::{KeywordQuery, similarity_score};
use super::tokenize::tokenize;

/// Questions and answers shorter than this (in characters, after trimming) are skipped.
const MIN_FIELD_LENGTH: usize = 10;

/// Placeholder some exports write for empty cells.
const MISSING_PLACEHOLDER: &str = "nan";

/// Why a record did not make it into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    MissingQuestion,
    MissingAnswer,
    ShortQuestion(usize),
    ShortAnswer(usize),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingQuestion => write!(f, "missing question"),
            Self::MissingAnswer => write!(f, "missing answer"),
            Self::ShortQuestion(len) => write!(f, "question too short ({} chars)", len),
            Self::ShortAnswer(len) => write!(f, "answer too short ({} chars)", len),
        }
    }
}

/// Counts gathered while building the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Records supplied by the source, valid or not.
    pub records_read: usize,
    /// Records that became documents.
    pub documents: usize,
    /// Records rejected by validation.
    pub skipped: usize,
    /// Distinct `source` values among the documents.
    pub unique_sources: usize,
}

/// The full ordered document collection.
///
/// Built once from a record sequence and read-only afterwards, so it can be shared
/// behind an `Arc` and searched from many tasks without locking.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    documents: Vec<Document>,
    stats: IndexStats,
}

impl CorpusIndex {
    /// Validates and indexes records in input order.
    ///
    /// Records failing validation are skipped; the remaining documents keep ids
    /// derived from their original positions, so gaps are expected.
    pub fn build(records: impl IntoIterator<Item = CorpusRecord>) -> Self {
        let start = std::time::Instant::now();
        let mut documents = Vec::new();
        let mut records_read = 0;

        for (position, record) in records.into_iter().enumerate() {
            records_read += 1;
            match build_document(position, record) {
                Ok(doc) => documents.push(doc),
                Err(reason) => tracing::debug!("Skipping record {}: {}", position, reason),
            }
        }

        let unique_sources = documents
            .iter()
            .map(Document::source)
            .collect::<AHashSet<_>>()
            .len();

        let stats = IndexStats {
            records_read,
            documents: documents.len(),
            skipped: records_read - documents.len(),
            unique_sources,
        };

        tracing::info!(
            "Built corpus index: {} documents from {} records ({} skipped, {} sources) in {:?}",
            stats.documents,
            stats.records_read,
            stats.skipped,
            stats.unique_sources,
            start.elapsed()
        );

        Self { documents, stats }
    }

    /// Every indexed document, in input order.
    pub fn all(&self) -> &[Document] {
        &self.documents
    }

    /// The first `count` documents, for quick inspection.
    pub fn preview(&self, count: usize) -> &[Document] {
        &self.documents[..count.min(self.documents.len())]
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    /// Set-similarity search over question tokens.
    ///
    /// Keeps documents scoring at least `threshold`, best first. Equal scores keep
    /// corpus order.
    pub fn similarity_search(&self, query: &str, k: usize, threshold: f64) -> Vec<ScoredResult<'_>> {
        let query_tokens = tokenize(query);

        let mut results: Vec<_> = self
            .documents
            .iter()
            .map(|doc| ScoredResult::new(doc, similarity_score(&query_tokens, doc.tokens())))
            .filter(|result| result.score >= threshold)
            .collect();

        rank(&mut results, k);
        results
    }

    /// Substring and word-presence search over question, answer and source.
    ///
    /// Documents scoring zero are dropped. Blank queries match nothing.
    pub fn keyword_search(&self, query: &str, k: usize) -> Vec<ScoredResult<'_>> {
        let Some(keywords) = KeywordQuery::new(query) else {
            return vec![];
        };

        let mut results: Vec<_> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let lowered = doc.lowered();
                let score = keywords.score(&lowered.question, &lowered.answer, &lowered.source);
                (score > 0.0).then(|| ScoredResult::new(doc, score))
            })
            .collect();

        rank(&mut results, k);
        results
    }
}

/// Stable descending sort by score, then truncation to `k`.
pub(super) fn rank(results: &mut Vec<ScoredResult<'_>>, k: usize) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(k);
}

fn build_document(position: usize, record: CorpusRecord) -> Result<Document, SkipReason> {
    let question = clean_field(record.question).ok_or(SkipReason::MissingQuestion)?;
    let answer = clean_field(record.answer).ok_or(SkipReason::MissingAnswer)?;

    let question_length = question.chars().count();
    if question_length < MIN_FIELD_LENGTH {
        return Err(SkipReason::ShortQuestion(question_length));
    }
    let answer_length = answer.chars().count();
    if answer_length < MIN_FIELD_LENGTH {
        return Err(SkipReason::ShortAnswer(answer_length));
    }

    let source = clean_field(record.source)
        .filter(|source| !source.is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

    let tokens = tokenize(&question);
    let metadata = DocumentMetadata {
        source,
        question,
        answer,
        qa_pair_id: position,
        question_length,
        answer_length,
    };

    Ok(Document::new(format!("qa_{}", position), tokens, metadata))
}

/// Trims a field, treating the `nan` placeholder as absent.
fn clean_field(field: Option<String>) -> Option<String> {
    let trimmed = field?.trim().to_string();
    (trimmed != MISSING_PLACEHOLDER).then_some(trimmed)
}
