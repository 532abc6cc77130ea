//! Relevance scoring for the two retrieval strategies.
//!
//! - **Similarity**: Jaccard overlap of token sets plus a small boost when both
//!   sides use the same interrogative word. Always within [0, 1].
//! - **Keyword**: additive substring heuristics over question, answer and source,
//!   divided by ten. Non-negative but unbounded.

use ahash::AHashSet;

/// Interrogatives whose agreement between query and question is a strong topical signal.
pub const QUESTION_WORDS: [&str; 7] = ["how", "what", "where", "when", "why", "who", "which"];

const QUESTION_WORD_BOOST: f64 = 0.1;

const PHRASE_IN_QUESTION: f64 = 3.0;
const PHRASE_IN_ANSWER: f64 = 2.0;
const PHRASE_IN_SOURCE: f64 = 0.5;
const WORD_IN_QUESTION: f64 = 2.0;
const WORD_IN_ANSWER: f64 = 1.0;

/// Keyword scores are divided by this to land near the similarity range.
const KEYWORD_NORMALIZER: f64 = 10.0;

/// Query words must be longer than this to count individually.
const MIN_KEYWORD_LENGTH: usize = 2;

/// Jaccard similarity of the two token sets with the interrogative boost, capped at 1.
///
/// Tokens are compared as sets, so repeated words and word order do not matter.
/// An empty union scores 0.
pub fn similarity_score(query_tokens: &[String], doc_tokens: &[String]) -> f64 {
    let query: AHashSet<&str> = query_tokens.iter().map(String::as_str).collect();
    let doc: AHashSet<&str> = doc_tokens.iter().map(String::as_str).collect();

    let intersection = query.iter().filter(|token| doc.contains(*token)).count();
    let union = query.len() + doc.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    let jaccard = intersection as f64 / union as f64;

    let boost = QUESTION_WORDS
        .iter()
        .filter(|word| query.contains(*word) && doc.contains(*word))
        .count() as f64
        * QUESTION_WORD_BOOST;

    (jaccard + boost).min(1.0)
}

/// A query prepared once for keyword scoring against many documents.
#[derive(Debug, Clone)]
pub struct KeywordQuery {
    phrase: String,
    words: Vec<String>,
}

impl KeywordQuery {
    /// Lowercases the query and extracts its scoring words.
    ///
    /// Returns `None` for blank queries: an empty phrase is a substring of
    /// everything and would match the whole corpus.
    pub fn new(query: &str) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }

        let phrase = query.to_lowercase();
        let words = phrase
            .split_whitespace()
            .filter(|word| word.chars().count() > MIN_KEYWORD_LENGTH)
            .map(str::to_owned)
            .collect();

        Some(Self { phrase, words })
    }

    /// Scores one document. All fields must already be lowercased.
    pub fn score(&self, question: &str, answer: &str, source: &str) -> f64 {
        let mut score = 0.0;

        if question.contains(&self.phrase) {
            score += PHRASE_IN_QUESTION;
        }
        if answer.contains(&self.phrase) {
            score += PHRASE_IN_ANSWER;
        }

        for word in &self.words {
            if question.contains(word.as_str()) {
                score += WORD_IN_QUESTION;
            }
            if answer.contains(word.as_str()) {
                score += WORD_IN_ANSWER;
            }
        }

        if source.contains(&self.phrase) {
            score += PHRASE_IN_SOURCE;
        }

        score / KEYWORD_NORMALIZER
    }
}
