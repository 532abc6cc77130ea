//! Corpus sources: where question/answer records come from.
//!
//! A source performs one bulk read and returns every record in input order.
//! Record positions matter: document ids are derived from them, so sources keep
//! undecodable rows as empty records instead of dropping them.

use crate::error::LoadError;
use csv::ReaderBuilder;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Column/field names accepted for each record field, in priority order.
///
/// `instruction`/`output` match fine-tuning exports of the same dataset.
const QUESTION_FIELDS: &[&str] = &["question", "instruction"];
const ANSWER_FIELDS: &[&str] = &["answer", "output"];
const SOURCE_FIELDS: &[&str] = &["source", "source_document", "filename"];

/// One raw row from a corpus, before trimming and validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusRecord {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub source: Option<String>,
}

impl CorpusRecord {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        source: Option<&str>,
    ) -> Self {
        Self {
            question: Some(question.into()),
            answer: Some(answer.into()),
            source: source.map(str::to_owned),
        }
    }

    /// Builds a record from a JSON object, stringifying scalar values.
    fn from_json_object(object: &Map<String, Value>) -> Self {
        let field = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| object.get(*name).and_then(json_text))
        };

        Self {
            question: field(QUESTION_FIELDS),
            answer: field(ANSWER_FIELDS),
            source: field(SOURCE_FIELDS),
        }
    }
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Anything that can supply the full ordered list of corpus records.
pub trait CorpusSource: Send + Sync + std::fmt::Debug {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Reads every record. Fails only when the source as a whole is unusable.
    fn read_records(&self) -> Result<Vec<CorpusRecord>, LoadError>;
}

/// Supported on-disk corpus formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorpusFormat {
    /// Pick by file extension.
    #[default]
    Auto,
    Csv,
    Json,
    Jsonl,
}

/// Opens a file-backed source for `path`.
pub fn open_source(path: &Path, format: CorpusFormat) -> Result<Arc<dyn CorpusSource>, LoadError> {
    let format = match format {
        CorpusFormat::Auto => detect_format(path)?,
        explicit => explicit,
    };

    let source: Arc<dyn CorpusSource> = match format {
        CorpusFormat::Json => Arc::new(JsonSource::new(path, false)),
        CorpusFormat::Jsonl => Arc::new(JsonSource::new(path, true)),
        CorpusFormat::Csv | CorpusFormat::Auto => Arc::new(CsvSource::new(path)),
    };
    Ok(source)
}

fn detect_format(path: &Path) -> Result<CorpusFormat, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv") => Ok(CorpusFormat::Csv),
        Some("json") => Ok(CorpusFormat::Json),
        Some("jsonl" | "ndjson") => Ok(CorpusFormat::Jsonl),
        _ => Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// CSV corpus with a header row containing at least `question` and `answer`.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn unreadable(&self, error: &csv::Error) -> LoadError {
        LoadError::Unreadable {
            path: self.path.clone(),
            reason: error.to_string(),
        }
    }
}

impl CorpusSource for CsvSource {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn read_records(&self) -> Result<Vec<CorpusRecord>, LoadError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.unreadable(&e))?;

        let headers = reader.headers().map_err(|e| self.unreadable(&e))?.clone();
        let column = |names: &[&str]| {
            names.iter().find_map(|name| {
                headers
                    .iter()
                    .position(|header| header.trim().eq_ignore_ascii_case(name))
            })
        };

        let question_col = column(QUESTION_FIELDS).ok_or_else(|| LoadError::MissingColumn {
            path: self.path.clone(),
            column: "question",
        })?;
        let answer_col = column(ANSWER_FIELDS).ok_or_else(|| LoadError::MissingColumn {
            path: self.path.clone(),
            column: "answer",
        })?;
        let source_col = column(SOURCE_FIELDS);

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            match result {
                Ok(record) => {
                    let cell = |col: usize| record.get(col).map(str::to_owned);
                    records.push(CorpusRecord {
                        question: cell(question_col),
                        answer: cell(answer_col),
                        source: source_col.and_then(cell),
                    });
                }
                Err(e) if e.is_io_error() => return Err(self.unreadable(&e)),
                Err(e) => {
                    // Keep the slot so later rows retain their ordinal ids.
                    tracing::debug!("Undecodable CSV row {} in {}: {}", row, self.path.display(), e);
                    records.push(CorpusRecord::default());
                }
            }
        }

        Ok(records)
    }
}

/// JSON corpus: either a top-level array of objects or JSON Lines.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
    lines: bool,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>, lines: bool) -> Self {
        Self {
            path: path.into(),
            lines,
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> LoadError {
        LoadError::Malformed {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn parse_array(&self, text: &str) -> Result<Vec<CorpusRecord>, LoadError> {
        let value: Value = serde_json::from_str(text).map_err(|e| self.malformed(e.to_string()))?;
        let Value::Array(items) = value else {
            return Err(self.malformed("expected a top-level array of records"));
        };

        Ok(items
            .iter()
            .map(|item| match item {
                Value::Object(object) => CorpusRecord::from_json_object(object),
                _ => CorpusRecord::default(),
            })
            .collect())
    }

    fn parse_lines(&self, text: &str) -> Vec<CorpusRecord> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(line_no, line)| match serde_json::from_str::<Value>(line) {
                Ok(Value::Object(object)) => CorpusRecord::from_json_object(&object),
                Ok(_) => CorpusRecord::default(),
                Err(e) => {
                    tracing::debug!(
                        "Undecodable JSON line {} in {}: {}",
                        line_no + 1,
                        self.path.display(),
                        e
                    );
                    CorpusRecord::default()
                }
            })
            .collect()
    }
}

impl CorpusSource for JsonSource {
    fn describe(&self) -> String {
        let kind = if self.lines { "jsonl" } else { "json" };
        format!("{}:{}", kind, self.path.display())
    }

    fn read_records(&self) -> Result<Vec<CorpusRecord>, LoadError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| LoadError::Unreadable {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        if self.lines {
            Ok(self.parse_lines(&text))
        } else {
            self.parse_array(&text)
        }
    }
}

/// Records held in memory; useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<CorpusRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<CorpusRecord>) -> Self {
        Self { records }
    }
}

impl CorpusSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory:{} records", self.records.len())
    }

    fn read_records(&self) -> Result<Vec<CorpusRecord>, LoadError> {
        Ok(self.records.clone())
    }
}
