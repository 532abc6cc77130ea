//! Question answering on top of the knowledge base.
//!
//! Retrieval always runs. Generation is optional: without a generator, or when it
//! fails, the answer is taken directly from the best-ranked Q&A pair.

use crate::config::Config;
use crate::corpus::open_source;
use crate::generator::{Generator, OllamaGenerator};
use crate::knowledge::KnowledgeBase;
use crate::prompt::build_prompt;
use crate::search::{DEFAULT_K, DEFAULT_THRESHOLD, ScoredResult};
use anyhow::Context as _;
use std::sync::Arc;

/// Default contact named in fallback messages.
pub const DEFAULT_CONTACT: &str = "the platform team";

/// Number of top results inspected when collecting sources.
const SOURCE_WINDOW: usize = 3;

/// Maximum number of sources listed under an answer.
const MAX_SOURCES: usize = 2;

/// Retrieval and messaging knobs for [`Assistant`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantSettings {
    pub k: usize,
    pub threshold: f64,
    pub contact: String,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            threshold: DEFAULT_THRESHOLD,
            contact: DEFAULT_CONTACT.to_string(),
        }
    }
}

/// Answers free-text questions from the knowledge base.
pub struct Assistant {
    kb: Arc<KnowledgeBase>,
    generator: Option<Arc<dyn Generator>>,
    settings: AssistantSettings,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("kb", &self.kb)
            .field("generator", &self.generator.as_ref().map(|g| g.name().to_string()))
            .field("settings", &self.settings)
            .finish()
    }
}

impl Assistant {
    pub fn new(kb: Arc<KnowledgeBase>, settings: AssistantSettings) -> Self {
        Self {
            kb,
            generator: None,
            settings,
        }
    }

    /// Wires a corpus source, knowledge base and optional generator from `config`.
    ///
    /// Nothing is read here; the corpus loads on first use or via [`KnowledgeBase::load`].
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        let path = config
            .corpus
            .path
            .as_deref()
            .context("No corpus configured; set [corpus] path, KBASE_CORPUS or --corpus")?;
        let source = open_source(path, config.corpus.format)
            .with_context(|| format!("Failed to open corpus {}", path.display()))?;

        let kb = Arc::new(KnowledgeBase::new(source));
        let assistant = Self::new(kb, config.assistant_settings());

        if !config.generator.enabled {
            tracing::info!("Generation disabled; answers come straight from the knowledge base");
            return Ok(assistant);
        }

        let generator = OllamaGenerator::new(
            &config.generator.endpoint,
            config.generator.model.clone(),
            config.generator.timeout(),
        );
        tracing::info!(
            "Using {} model '{}' at {}",
            generator.name(),
            generator.model(),
            config.generator.endpoint
        );
        Ok(assistant.with_generator(Arc::new(generator)))
    }

    /// Attaches a generator used to phrase answers.
    pub fn with_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    /// Answers `message`, optionally in the context of an ongoing conversation.
    ///
    /// Never fails: load errors and empty retrievals turn into user-facing messages.
    pub async fn answer(&self, message: &str, thread_context: Option<&str>) -> String {
        let thread_context = thread_context.map(str::trim).filter(|t| !t.is_empty());

        let index = match self.kb.index().await {
            Ok(index) => index,
            Err(e) => {
                tracing::error!("Knowledge base unavailable: {}", e);
                return self.unavailable_message();
            }
        };

        let results = index.search(message, self.settings.k, self.settings.threshold);
        let Some(top) = results.first() else {
            tracing::info!("No relevant documents for '{}'", message);
            return self.no_information_message(thread_context.is_some());
        };

        let body = match &self.generator {
            Some(generator) => {
                let prompt = build_prompt(message, &results, thread_context);
                match generator.generate(&prompt).await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(
                            "Generator '{}' failed, answering from top result: {}",
                            generator.name(),
                            e
                        );
                        direct_answer(top)
                    }
                }
            }
            None => direct_answer(top),
        };

        match sources_footer(&results) {
            Some(footer) => format!("{body}\n\n{footer}"),
            None => body,
        }
    }

    fn unavailable_message(&self) -> String {
        format!(
            "Sorry, I'm having trouble accessing the knowledge base right now. Please contact {} for assistance.",
            self.settings.contact
        )
    }

    fn no_information_message(&self, in_thread: bool) -> String {
        if in_thread {
            format!(
                "I don't have specific information in the knowledge base for this question, but based on our \
                 conversation we were discussing related topics. Please contact {} for more detailed information.",
                self.settings.contact
            )
        } else {
            format!(
                "Sorry, I couldn't find relevant information in the knowledge base for your question. Please contact {} directly.",
                self.settings.contact
            )
        }
    }
}

/// Answer text taken verbatim from a retrieved pair.
fn direct_answer(top: &ScoredResult<'_>) -> String {
    format!(
        "Here's what I found for \"{}\":\n\n{}",
        top.metadata.question, top.metadata.answer
    )
}

/// Unique sources of the top results, in ranked order.
pub fn cited_sources<'a>(results: &[ScoredResult<'a>]) -> Vec<&'a str> {
    let mut sources: Vec<&str> = Vec::with_capacity(MAX_SOURCES);
    for result in results.iter().take(SOURCE_WINDOW) {
        let source = result.metadata.source.as_str();
        if !sources.contains(&source) {
            sources.push(source);
        }
        if sources.len() == MAX_SOURCES {
            break;
        }
    }
    sources
}

fn sources_footer(results: &[ScoredResult<'_>]) -> Option<String> {
    let sources = cited_sources(results);
    (!sources.is_empty()).then(|| format!("Sources: {}", sources.join(", ")))
}
