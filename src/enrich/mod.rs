pub mod agents;
pub mod providers;

use crate::config::AiConfig;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tracing::warn;

#[derive(Debug)]
pub enum GenAiError {
    ConnectionError(String),
    ResponseError(String),
    ConfigError(String),
    NotConfigured,
}

impl fmt::Display for GenAiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenAiError::ConnectionError(msg) => write!(f, "Generation connection error: {}", msg),
            GenAiError::ResponseError(msg) => write!(f, "Generation response error: {}", msg),
            GenAiError::ConfigError(msg) => write!(f, "Generation configuration error: {}", msg),
            GenAiError::NotConfigured => write!(f, "No generation backend configured"),
        }
    }
}

impl Error for GenAiError {}

/// An inline media attachment for multimodal prompts.
#[derive(Debug, Clone, Copy)]
pub struct MediaPart<'a> {
    pub mime_type: &'a str,
    pub data: &'a [u8],
}

/// Boundary to the external text/vision generation service: a populated
/// instruction template (plus optional media) in, free text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, media: Option<MediaPart<'_>>)
        -> Result<String, GenAiError>;
}

/// Holds the configured generation backend, if any. With no backend the
/// enrichment agents fall back to their deterministic mock values, so the
/// catalog keeps working without the external service.
pub struct GenAiManager {
    generator: Option<Box<dyn TextGenerator>>,
}

impl GenAiManager {
    pub fn new(config: &AiConfig) -> Result<Self, GenAiError> {
        let generator: Option<Box<dyn TextGenerator>> = match config.backend.as_str() {
            "gemini" => match config.api_key.as_deref() {
                Some(key) if !key.is_empty() => {
                    Some(Box::new(providers::gemini::GeminiProvider::new(config)?))
                }
                _ => {
                    warn!("Gemini backend selected without an API key; agents will serve mock responses");
                    None
                }
            },
            "mock" => None,
            other => {
                return Err(GenAiError::ConfigError(format!(
                    "Unsupported generation backend: {}",
                    other
                )))
            }
        };

        Ok(Self { generator })
    }

    /// Wraps an explicit generator; used to plug fixture backends into tests.
    #[cfg(test)]
    pub fn with_generator(generator: Box<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn generate(
        &self,
        prompt: &str,
        media: Option<MediaPart<'_>>,
    ) -> Result<String, GenAiError> {
        match &self.generator {
            Some(generator) => generator.generate(prompt, media).await,
            None => Err(GenAiError::NotConfigured),
        }
    }
}

/// Strips a leading/trailing markdown code fence from a model response.
/// Generation services routinely wrap JSON payloads in ```json blocks.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}
