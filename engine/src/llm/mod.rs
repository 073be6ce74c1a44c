//! Text generation layer
//!
//! The language model is an external collaborator. This module defines the
//! `TextGenerator` trait every backend implements (Ollama, OpenAI-compatible
//! completion servers, test doubles), plus the `GenerationPipeline` that wraps
//! a generator and owns the post-processing of its raw output.

use async_trait::async_trait;
use sdk::errors::EngineError;
use std::sync::Arc;

use crate::config::{GenerationConfig, LLMConfig};

pub mod ollama;
pub mod openai_compat;
pub mod pipeline;

pub use pipeline::{extract_answer, GenerationPipeline, GenerationResult};

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<LLMError> for EngineError {
    fn from(err: LLMError) -> Self {
        EngineError::Generation(err.to_string())
    }
}

/// Text generation backend
///
/// Implementations continue a raw prompt and return only the newly generated
/// text. They must not post-process the completion; truncation at the next
/// turn marker belongs to the pipeline.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the name of the backend (e.g., "ollama")
    fn name(&self) -> &str;

    /// Generate a continuation of `prompt`
    ///
    /// # Arguments
    /// * `prompt` - Fully assembled prompt (persona header, transcript, cue)
    /// * `config` - Sampling parameters
    ///
    /// # Returns
    /// * `Ok(String)` - Raw generated text, without the prompt
    /// * `Err(LLMError)` - If the request fails
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String>;

    /// Check if the backend is currently reachable
    /// Default implementation returns true.
    async fn check_health(&self) -> bool {
        true
    }

    /// Whether `GenerationConfig::eos_token_id` is passed on to the backend
    fn honors_eos_token_id(&self) -> bool {
        false
    }
}

/// Build the generator selected by `llm.provider`
pub fn generator_from_config(
    config: &LLMConfig,
) -> std::result::Result<Arc<dyn TextGenerator>, EngineError> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(ollama::OllamaGenerator::from_config(
            &config.ollama,
        ))),
        "openai_compat" => Ok(Arc::new(openai_compat::OpenAICompatGenerator::from_config(
            &config.openai_compat,
        ))),
        other => Err(EngineError::Config(format!("Unknown provider '{}'", other))),
    }
}
