//! Lexical retrieval over the Q&A corpus.
//!
//! This module provides tokenization, the in-memory corpus index, the two
//! scoring strategies (set similarity and keyword overlap), and their fusion.

// Module declarations
pub(crate) mod document;
pub(crate) mod fusion;
pub(crate) mod index;
pub(crate) mod scoring;
pub(crate) mod tokenize;

// Public re-exports (used via lib.rs)
pub use document::{Document, DocumentMetadata, ScoredResult, UNKNOWN_SOURCE};
pub use fusion::{DEFAULT_K, DEFAULT_THRESHOLD, fuse};
pub use index::{CorpusIndex, IndexStats};
pub use scoring::{KeywordQuery, QUESTION_WORDS, similarity_score};
pub use tokenize::tokenize;
