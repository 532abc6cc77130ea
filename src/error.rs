//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for kbase-mcp glue code.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` at the entry points. Domain failures use the typed errors below.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when the corpus cannot be read as a whole.
///
/// Individual bad records are never reported here; they are skipped during
/// indexing. This error is `Clone` so a single in-flight load can hand the same
/// failure to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The corpus file could not be opened or read.
    #[error("Corpus not readable at {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },
    /// A tabular corpus lacks a column every record needs.
    #[error("Corpus at {} has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    /// The corpus is structurally invalid (e.g. not a JSON array).
    #[error("Corpus at {} is malformed: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
    /// The corpus format could not be determined from the file name.
    #[error("Cannot tell the corpus format of {}; use csv, json or jsonl", path.display())]
    UnsupportedFormat { path: PathBuf },
    /// The background load task died before producing an index.
    #[error("Corpus load was interrupted: {0}")]
    Interrupted(String),
}
