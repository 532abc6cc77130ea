//! Shared test fixtures and utilities for integration tests.
//!
//! Every fixture writes its corpus into a fresh temporary directory, so tests
//! never share a knowledge base or its load state.
//!
//! # Available Fixtures
//!
//! - `faq_corpus`: a small CSV corpus covering the common retrieval cases
//! - `faq_assistant`: an [`Assistant`] over `faq_corpus` with generation disabled

#![allow(dead_code)] // Items used across different integration test crates

use kbase_mcp::corpus::{CorpusFormat, open_source};
use kbase_mcp::{Assistant, AssistantSettings, KnowledgeBase};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Rows of the shared FAQ corpus. Row positions become `qa_{n}` ids.
///
/// - rows 0 and 4 share a question but come from different sources
/// - row 2 is too short to index
/// - row 5 has no source
pub const FAQ_CSV: &str = "\
question,answer,source,category
How do I reset my password?,\"Open Settings, choose Security, then click Reset password.\",wiki,account
Where can I find the deployment logs?,Deployment logs are in the observability dashboard under Pipelines.,runbook,ops
Short?,Too short,wiki,misc
What is the on-call rotation schedule?,The rotation changes every Monday at 10:00 and is published in the on-call calendar.,oncall-guide,ops
How do I reset my password?,Use the self-service portal and follow the email link to reset it.,helpdesk,account
Who approves production access requests?,Production access is approved by the platform team lead.,,access
";

/// A temporary directory that is removed when dropped.
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

impl TempWorkspace {
    pub fn new() -> Self {
        kbase_mcp::tracing::init();
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Writes `contents` to `relative` and returns the absolute path.
    pub fn create_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.join(relative);
        std::fs::write(&path, contents)
            .unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));
        path
    }
}

/// A corpus file on disk plus the directory that owns it.
pub struct TestCorpus {
    pub workspace: TempWorkspace,
    pub path: PathBuf,
}

impl TestCorpus {
    pub fn write(name: &str, contents: &str) -> Self {
        let workspace = TempWorkspace::new();
        let path = workspace.create_file(name, contents);
        Self { workspace, path }
    }

    /// A fresh, unloaded knowledge base over this file.
    pub fn knowledge_base(&self) -> Arc<KnowledgeBase> {
        let source = open_source(&self.path, CorpusFormat::Auto).expect("Failed to open corpus");
        Arc::new(KnowledgeBase::new(source))
    }
}

#[fixture]
pub fn faq_corpus() -> TestCorpus {
    TestCorpus::write("faq.csv", FAQ_CSV)
}

/// Assistant over the FAQ corpus that answers without a generator.
///
/// The corpus directory is returned alongside so it outlives the assistant.
#[fixture]
pub fn faq_assistant(faq_corpus: TestCorpus) -> (TestCorpus, Assistant) {
    let assistant = Assistant::new(faq_corpus.knowledge_base(), AssistantSettings::default());
    (faq_corpus, assistant)
}
