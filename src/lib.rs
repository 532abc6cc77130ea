pub mod assistant;
pub mod config;
pub mod corpus;
pub mod error;
pub mod generator;
pub mod knowledge;
pub mod prompt;
pub mod search;
pub mod server;
pub mod tools;
pub mod tracing;

pub use assistant::{Assistant, AssistantSettings};
pub use config::Config;
pub use corpus::{CorpusFormat, CorpusRecord, CorpusSource, open_source};
pub use error::{LoadError, Result};
pub use generator::{Generator, GeneratorError, OllamaGenerator};
pub use knowledge::{KnowledgeBase, LoadPhase};
pub use search::{CorpusIndex, IndexStats, ScoredResult};
pub use server::KnowledgeServer;
