//! OpenAI-compatible completions generator
//!
//! Talks to any server exposing the legacy `/completions` endpoint (llama.cpp
//! server, vLLM, text-generation-webui). The endpoint takes a raw prompt, which
//! keeps the persona transcript format intact. `top_k` and `stop_token_ids`
//! (the configured end-of-sequence token) are sent as extension fields;
//! servers that do not know them ignore them.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use super::{LLMError, Result, TextGenerator};
use crate::config::{GenerationConfig, OpenAICompatConfig};
use crate::conversation::HUMAN_MARKER;

pub struct OpenAICompatGenerator {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAICompatGenerator {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Build from config, reading the API key from the configured env var
    pub fn from_config(config: &OpenAICompatConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());

        Self::new(
            &config.base_url,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn build_payload(&self, prompt: &str, config: &GenerationConfig) -> serde_json::Value {
        let (temperature, top_k) = if config.sampling_enabled {
            (config.temperature, config.top_k)
        } else {
            (0.0, 1)
        };

        let mut payload = json!({
            "model": self.model,
            "prompt": prompt,
            "max_tokens": config.max_new_tokens,
            "temperature": temperature,
            "top_p": config.top_p,
            "top_k": top_k,
            "stop": [HUMAN_MARKER],
            "stream": false,
        });

        if let Some(eos) = config.eos_token_id {
            payload["stop_token_ids"] = json!([eos]);
        }

        payload
    }
}

impl std::fmt::Debug for OpenAICompatGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAICompatGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl TextGenerator for OpenAICompatGenerator {
    fn name(&self) -> &str {
        "openai_compat"
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let url = format!("{}/completions", self.base_url);
        let payload = self.build_payload(prompt, config);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&payload);

        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LLMError::Timeout
            } else if e.is_connect() {
                LLMError::ProviderUnavailable(format!("Cannot connect to {}", self.base_url))
            } else {
                LLMError::NetworkError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(LLMError::AuthenticationFailed(text));
            } else if status.is_server_error() {
                return Err(LLMError::ProviderUnavailable(format!(
                    "Server error ({}): {}",
                    status, text
                )));
            } else {
                return Err(LLMError::InvalidRequest(text));
            }
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let choice = data
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| LLMError::ParseError("No choices in response".to_string()))?;

        choice
            .get("text")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| LLMError::ParseError("No text in choice".to_string()))
    }

    fn honors_eos_token_id(&self) -> bool {
        true
    }

    async fn check_health(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Completion server health check failed: {}", e);
                false
            }
        }
    }
}
