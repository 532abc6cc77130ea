//! Configuration file and environment handling.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, environment
//! variables, command-line flags (applied by the binary).

use crate::assistant::{AssistantSettings, DEFAULT_CONTACT};
use crate::corpus::CorpusFormat;
use crate::generator::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::search::{DEFAULT_K, DEFAULT_THRESHOLD};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name under the platform config dir.
const APP_DIR: &str = "kbase-mcp";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming the corpus file.
pub const ENV_CORPUS: &str = "KBASE_CORPUS";
/// Environment variable naming the generation model.
pub const ENV_MODEL: &str = "KBASE_MODEL";
/// Environment variable naming the Ollama endpoint.
pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub retrieval: RetrievalConfig,
    pub generator: GeneratorConfig,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorpusConfig {
    /// Corpus file. Required before anything can be loaded.
    pub path: Option<PathBuf>,
    pub format: CorpusFormat,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrievalConfig {
    pub k: usize,
    pub threshold: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantConfig {
    /// Who users are pointed to when the knowledge base cannot help.
    pub contact: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            contact: DEFAULT_CONTACT.to_string(),
        }
    }
}

impl Config {
    /// Default config path (`<config_dir>/kbase-mcp/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads configuration, then applies environment overrides.
    ///
    /// An explicit `path` must exist. Without one, the default path is used when
    /// present and built-in defaults otherwise. The result is not validated:
    /// callers apply their own overrides first and then call [`Config::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load_from(&path)?,
                None => {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parses a config file without applying overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Applies environment overrides through `lookup`. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(corpus) = var(ENV_CORPUS) {
            self.corpus.path = Some(PathBuf::from(corpus));
        }
        if let Some(model) = var(ENV_MODEL) {
            self.generator.model = model;
        }
        if let Some(host) = var(ENV_OLLAMA_HOST) {
            self.generator.endpoint = normalize_host(&host);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retrieval.k == 0 {
            return Err(ConfigError::Invalid("retrieval.k must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.retrieval.threshold) {
            return Err(ConfigError::Invalid(format!(
                "retrieval.threshold must be within [0, 1], got {}",
                self.retrieval.threshold
            )));
        }
        if self.generator.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "generator.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn assistant_settings(&self) -> AssistantSettings {
        AssistantSettings {
            k: self.retrieval.k,
            threshold: self.retrieval.threshold,
            contact: self.assistant.contact.clone(),
        }
    }
}

/// `OLLAMA_HOST` is often given as `host:port` without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim();
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
