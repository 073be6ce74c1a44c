//! Ollama Text Generator
//!
//! This module implements the TextGenerator trait for Ollama, a local LLM server
//! typically listening at http://localhost:11434.
//!
//! Prompts are sent to `/api/generate` in raw mode: the persona header and
//! transcript are already laid out by the prompt assembler, so Ollama's own
//! chat template must not be applied on top.
//!
//! Sampling parameters map onto Ollama's `options`:
//! - `max_new_tokens` -> `num_predict`
//! - `temperature`, `top_p`, `top_k` pass through
//! - greedy decoding (sampling disabled) sends `temperature = 0`, `top_k = 1`

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{LLMError, Result, TextGenerator};
use crate::config::{GenerationConfig, OllamaConfig};
use crate::conversation::HUMAN_MARKER;

/// Ollama generator configuration
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    /// Base URL for Ollama API (typically http://localhost:11434)
    base_url: String,

    /// Model name to use (e.g., "llama3.2:1b")
    model: String,

    /// HTTP client for API requests
    client: Client,
}

impl OllamaGenerator {
    /// Create a new Ollama generator with the default timeout
    ///
    /// # Arguments
    /// * `base_url` - Base URL for Ollama API (e.g., "http://localhost:11434")
    /// * `model` - Model name to use (e.g., "llama3.2:1b")
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(base_url, model, Duration::from_secs(300))
    }

    /// Create a new Ollama generator with an explicit request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn from_config(config: &OllamaConfig) -> Self {
        Self::with_timeout(
            &config.base_url,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Build the request body for a prompt
    fn build_request(&self, prompt: &str, config: &GenerationConfig) -> OllamaRequest {
        let (temperature, top_k) = if config.sampling_enabled {
            (config.temperature, config.top_k)
        } else {
            (0.0, 1)
        };

        OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            raw: true,
            stream: false,
            options: OllamaOptions {
                num_predict: config.max_new_tokens,
                temperature,
                top_p: config.top_p,
                top_k,
                stop: vec![HUMAN_MARKER.to_string()],
            },
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let request = self.build_request(prompt, config);

        tracing::debug!(
            "Ollama request: model={}, prompt_chars={}, num_predict={}",
            self.model,
            prompt.len(),
            request.options.num_predict
        );

        let url = format!("{}/api/generate", self.base_url);
        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else if e.is_connect() {
                    LLMError::ProviderUnavailable(format!(
                        "Cannot connect to Ollama at {}. Is Ollama running?",
                        self.base_url
                    ))
                } else {
                    LLMError::NetworkError(e.to_string())
                }
            })?;

        tracing::info!(
            "Ollama response received in {:.1}s",
            start.elapsed().as_secs_f64()
        );

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::ProviderUnavailable(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(ollama_response.response)
    }

    async fn check_health(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Ollama health check failed: {}", e);
                false
            }
        }
    }
}

/// Ollama `/api/generate` request format
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    raw: bool,
    stream: bool,
    options: OllamaOptions,
}

/// Ollama sampling options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f64,
    top_p: f64,
    top_k: u32,
    stop: Vec<String>,
}

/// Ollama `/api/generate` response format
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[allow(dead_code)]
    #[serde(default)]
    done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_generator_name() {
        let generator = OllamaGenerator::new("http://localhost:11434", "llama3.2:1b");
        assert_eq!(generator.name(), "ollama");
        // The raw generate API has no end-of-sequence token option
        assert!(!generator.honors_eos_token_id());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let generator = OllamaGenerator::new("http://localhost:11434/", "llama3.2:1b");
        assert_eq!(generator.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_request_mapping_with_sampling() {
        let generator = OllamaGenerator::new("http://localhost:11434", "llama3.2:1b");
        let config = GenerationConfig::default();

        let request = generator.build_request("prompt text", &config);
        assert_eq!(request.model, "llama3.2:1b");
        assert_eq!(request.prompt, "prompt text");
        assert!(request.raw);
        assert!(!request.stream);
        assert_eq!(request.options.num_predict, 180);
        assert_eq!(request.options.temperature, 0.7);
        assert_eq!(request.options.top_p, 0.9);
        assert_eq!(request.options.top_k, 50);
        assert_eq!(request.options.stop, vec!["Human:".to_string()]);
    }

    #[test]
    fn test_request_mapping_greedy() {
        let generator = OllamaGenerator::new("http://localhost:11434", "llama3.2:1b");
        let config = GenerationConfig {
            sampling_enabled: false,
            ..GenerationConfig::default()
        };

        let request = generator.build_request("p", &config);
        assert_eq!(request.options.temperature, 0.0);
        assert_eq!(request.options.top_k, 1);
    }

    #[test]
    fn test_request_serialization() {
        let generator = OllamaGenerator::new("http://localhost:11434", "llama3.2:1b");
        let request = generator.build_request("p", &GenerationConfig::default());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["raw"], true);
        assert_eq!(json["options"]["num_predict"], 180);
        assert_eq!(json["options"]["stop"][0], "Human:");
    }
}
