//! Text generation backends used to phrase answers from retrieved context.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model name.
pub const DEFAULT_MODEL: &str = "llama3.2:1b";

/// Failure of a generation call. Retrieval results stay usable when this happens.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The backend could not be reached or timed out.
    #[error("{backend} connection failed ({url}): {reason}")]
    Connect {
        backend: &'static str,
        url: String,
        reason: String,
    },
    /// The backend answered with a non-success status.
    #[error("{backend} API error {status}: {body}")]
    Status {
        backend: &'static str,
        status: u16,
        body: String,
    },
    /// The backend answered with something we could not read.
    #[error("{backend} returned an unexpected response: {reason}")]
    Format {
        backend: &'static str,
        reason: String,
    },
}

/// Anything that turns a rendered prompt into text.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

/// Non-streaming client for Ollama's `/api/generate`.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    timeout: Duration,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaGenerator {
    const BACKEND: &'static str = "ollama";

    pub fn new(base_url: &str, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
            client: Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn parse_response(body: &str) -> Result<String, GeneratorError> {
        let parsed: GenerateResponse =
            serde_json::from_str(body).map_err(|e| GeneratorError::Format {
                backend: Self::BACKEND,
                reason: e.to_string(),
            })?;

        let text = parsed.response.trim();
        if text.is_empty() {
            return Err(GeneratorError::Format {
                backend: Self::BACKEND,
                reason: "empty response".to_string(),
            });
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn name(&self) -> &str {
        Self::BACKEND
    }

    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let url = self.url();
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let connect_error = |e: reqwest::Error| GeneratorError::Connect {
            backend: Self::BACKEND,
            url: url.clone(),
            reason: e.to_string(),
        };

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(connect_error)?;

        let status = resp.status();
        let text = resp.text().await.map_err(connect_error)?;

        if !status.is_success() {
            return Err(GeneratorError::Status {
                backend: Self::BACKEND,
                status: status.as_u16(),
                body: text,
            });
        }

        Self::parse_response(&text)
    }
}
