//! Generation Pipeline
//!
//! Wraps a `TextGenerator` with the fixed generation parameters of a session
//! and derives the answer that is shown and remembered. Models continuing a
//! transcript often run past their own turn and start writing the human's next
//! line; everything from the first `Human:` marker onward is discarded.

use std::sync::Arc;

use super::{Result, TextGenerator};
use crate::config::GenerationConfig;
use crate::conversation::HUMAN_MARKER;

/// Raw completion plus the answer derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    raw: String,
    answer: Option<String>,
}

impl GenerationResult {
    /// Derive the answer from a raw completion
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let answer = extract_answer(&raw);
        let answer = (!answer.is_empty()).then(|| answer.to_string());
        Self { raw, answer }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The post-processed answer, `None` when nothing usable was generated
    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn into_answer(self) -> Option<String> {
        self.answer
    }
}

/// Cut a raw completion at the first human-turn marker and trim it
pub fn extract_answer(raw: &str) -> &str {
    let end = raw.find(HUMAN_MARKER).unwrap_or(raw.len());
    raw[..end].trim()
}

/// Generator plus the session's fixed sampling parameters
pub struct GenerationPipeline {
    generator: Arc<dyn TextGenerator>,
    config: GenerationConfig,
}

impl GenerationPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, config: GenerationConfig) -> Self {
        let pipeline = Self { generator, config };
        if pipeline.ignores_eos_token_id() {
            tracing::warn!(
                "generation.eos_token_id is set but the {} backend does not support it; \
                 replies stop at the next human turn instead",
                pipeline.generator.name()
            );
        }
        pipeline
    }

    /// An end-of-sequence token is configured but the backend cannot use it
    pub fn ignores_eos_token_id(&self) -> bool {
        self.config.eos_token_id.is_some() && !self.generator.honors_eos_token_id()
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Run one generation and post-process its output
    pub async fn run(&self, prompt: &str) -> Result<GenerationResult> {
        let start = std::time::Instant::now();
        let raw = self.generator.generate(prompt, &self.config).await?;

        tracing::debug!(
            "{} generated {} chars in {:.1}s",
            self.generator.name(),
            raw.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(GenerationResult::from_raw(raw))
    }

    /// Whether the underlying generator is reachable
    pub async fn check_health(&self) -> bool {
        self.generator.check_health().await
    }
}

impl std::fmt::Debug for GenerationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationPipeline")
            .field("generator", &self.generator.name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMError;
    use async_trait::async_trait;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenGenerator;

    #[async_trait]
    impl TextGenerator for BrokenGenerator {
        fn name(&self) -> &str {
            "broken"
        }

        async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> Result<String> {
            Err(LLMError::Timeout)
        }
    }

    #[test]
    fn test_truncates_at_next_human_turn() {
        assert_eq!(extract_answer("Hello there\nHuman: what now"), "Hello there");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(extract_answer("  \n I like jazz.  \n"), "I like jazz.");
    }

    #[test]
    fn test_no_marker_keeps_everything() {
        assert_eq!(extract_answer("Just an answer"), "Just an answer");
    }

    #[test]
    fn test_truncates_at_first_marker_only() {
        assert_eq!(
            extract_answer("One\nHuman: two\nEva: three\nHuman: four"),
            "One"
        );
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(GenerationResult::from_raw("").answer(), None);
        assert_eq!(GenerationResult::from_raw("   \n\t").answer(), None);
        assert_eq!(GenerationResult::from_raw("\nHuman: hi").answer(), None);
    }

    #[test]
    fn test_result_keeps_raw() {
        let result = GenerationResult::from_raw("Sure!\nHuman: thanks");
        assert_eq!(result.raw(), "Sure!\nHuman: thanks");
        assert_eq!(result.answer(), Some("Sure!"));
        assert_eq!(result.into_answer(), Some("Sure!".to_string()));
    }

    #[tokio::test]
    async fn test_pipeline_run() {
        let pipeline = GenerationPipeline::new(
            Arc::new(CannedGenerator(" Hi!\nHuman: bye")),
            GenerationConfig::default(),
        );

        let result = pipeline.run("prompt").await.unwrap();
        assert_eq!(result.answer(), Some("Hi!"));
        assert_eq!(pipeline.generator_name(), "canned");
    }

    struct EosAwareGenerator;

    #[async_trait]
    impl TextGenerator for EosAwareGenerator {
        fn name(&self) -> &str {
            "eos-aware"
        }

        async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> Result<String> {
            Ok(String::new())
        }

        fn honors_eos_token_id(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_unsupported_eos_token_is_detected() {
        let with_eos = GenerationConfig {
            eos_token_id: Some(2),
            ..GenerationConfig::default()
        };

        let pipeline = GenerationPipeline::new(Arc::new(CannedGenerator("")), with_eos.clone());
        assert!(pipeline.ignores_eos_token_id());

        let pipeline = GenerationPipeline::new(Arc::new(EosAwareGenerator), with_eos);
        assert!(!pipeline.ignores_eos_token_id());

        let pipeline =
            GenerationPipeline::new(Arc::new(CannedGenerator("")), GenerationConfig::default());
        assert!(!pipeline.ignores_eos_token_id());
    }

    #[tokio::test]
    async fn test_pipeline_propagates_errors() {
        let pipeline =
            GenerationPipeline::new(Arc::new(BrokenGenerator), GenerationConfig::default());

        let result = pipeline.run("prompt").await;
        assert!(matches!(result, Err(LLMError::Timeout)));
    }
}
