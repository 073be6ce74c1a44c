//! Configuration management
//!
//! This module handles loading, validation, and management of the Eva configuration.
//! Configuration is stored in TOML format at ~/.eva/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level and persona profile location
//! - **memory**: How many exchanges the conversation memory keeps
//! - **generation**: Sampling parameters passed to the text generator
//! - **llm**: Which generator backend to use and how to reach it
//!
//! # Examples
//!
//! ```no_run
//! use eva_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from default location
//! let config = Config::load_or_create()?;
//!
//! println!("Profile: {:?}", config.core.profile);
//! println!("Exchanges remembered: {}", config.memory.max_turns);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Generator backends understood by `llm.provider`
pub const VALID_PROVIDERS: &[&str] = &["ollama", "openai_compat"];

const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    pub core: CoreConfig,

    /// Conversation memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Generation parameters
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Generator backend settings
    #[serde(default)]
    pub llm: LLMConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Persona profile JSON file (supports ~ expansion)
    #[serde(default = "default_profile_path")]
    pub profile: PathBuf,
}

/// Conversation memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Number of exchanges (human + agent turn pairs) kept in memory
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
        }
    }
}

/// Fixed generation parameters, identical for every request of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on generated tokens
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Nucleus sampling threshold
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Top-k sampling cutoff
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Sample (true) or decode greedily (false)
    #[serde(default = "default_true")]
    pub sampling_enabled: bool,

    /// End-of-sequence token id, for backends that address tokens directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eos_token_id: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            sampling_enabled: true,
            eos_token_id: None,
        }
    }
}

/// Generator backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Backend to use (ollama, openai_compat)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Ollama settings
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// OpenAI-compatible completions server settings
    #[serde(default)]
    pub openai_compat: OpenAICompatConfig,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            ollama: OllamaConfig::default(),
            openai_compat: OpenAICompatConfig::default(),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL for Ollama API
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// OpenAI-compatible `/completions` server configuration
/// (llama.cpp server, vLLM, text-generation-webui, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAICompatConfig {
    /// Base URL up to and including the version segment
    #[serde(default = "default_openai_compat_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_openai_compat_model")]
    pub model: String,

    /// Environment variable holding the API key, if the server needs one
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    // Note: the key itself never lives in the config file
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for OpenAICompatConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_compat_base_url(),
            model: default_openai_compat_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

fn default_profile_path() -> PathBuf {
    PathBuf::from("~/.eva/profile.json")
}

fn default_max_turns() -> usize {
    6
}

fn default_max_new_tokens() -> u32 {
    180
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    0.9
}

fn default_top_k() -> u32 {
    50
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:1b".to_string()
}

fn default_openai_compat_base_url() -> String {
    "http://localhost:8080/v1".to_string()
}

fn default_openai_compat_model() -> String {
    "default".to_string()
}

fn default_api_key_env() -> String {
    "EVA_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Config {
    /// Load configuration from the default location (~/.eva/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();

        // Serialize before path expansion so the file keeps the portable ~ form
        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Created default configuration at {:?}", path);

        config.validate_and_process()?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.eva/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".eva").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            core: CoreConfig {
                log_level: default_log_level(),
                profile: default_profile_path(),
            },
            memory: MemoryConfig::default(),
            generation: GenerationConfig::default(),
            llm: LLMConfig::default(),
        }
    }

    /// Override the profile location (from the command line)
    pub fn set_profile_path(&mut self, path: &Path) -> Result<(), EngineError> {
        self.core.profile = expand_path(path)?;
        Ok(())
    }

    /// Override the log level (from the command line)
    pub fn set_log_level(&mut self, level: &str) -> Result<(), EngineError> {
        validate_log_level(level)?;
        self.core.log_level = level.to_string();
        Ok(())
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates the log level and provider name
    /// - Checks memory and sampling bounds
    /// - Expands ~ in the profile path
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        validate_log_level(&self.core.log_level)?;

        if !VALID_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid provider '{}'. Must be one of: {}",
                self.llm.provider,
                VALID_PROVIDERS.join(", ")
            )));
        }

        if self.memory.max_turns == 0 {
            return Err(EngineError::Config(
                "memory.max_turns must be at least 1".to_string(),
            ));
        }

        self.generation.validate()?;

        self.core.profile = expand_path(&self.core.profile)?;

        Ok(())
    }
}

impl GenerationConfig {
    /// Check sampling parameters are within the ranges every backend accepts
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_new_tokens == 0 {
            return Err(EngineError::Config(
                "generation.max_new_tokens must be at least 1".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(EngineError::Config(
                "generation.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.sampling_enabled && self.temperature == 0.0 {
            return Err(EngineError::Config(
                "generation.temperature must be above 0.0 when sampling is enabled".to_string(),
            ));
        }

        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(EngineError::Config(
                "generation.top_p must be greater than 0.0 and at most 1.0".to_string(),
            ));
        }

        if self.top_k == 0 {
            return Err(EngineError::Config(
                "generation.top_k must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_log_level(level: &str) -> Result<(), EngineError> {
    if VALID_LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(EngineError::Config(format!(
            "Invalid log level '{}'. Must be one of: {}",
            level,
            VALID_LOG_LEVELS.join(", ")
        )))
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
