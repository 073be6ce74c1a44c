//! Integration tests for configuration management
//!
//! These tests verify that the Config struct can be properly loaded from
//! disk, validated, and processed with path expansion.

use std::fs;
use tempfile::TempDir;

use eva_engine::config::Config;

#[test]
fn test_config_toml_parsing() {
    let toml_content = r#"
[core]
log_level = "debug"
profile = "/srv/eva/mira.json"

[memory]
max_turns = 4

[generation]
max_new_tokens = 120
temperature = 0.5
top_p = 0.8
top_k = 20
sampling_enabled = true
eos_token_id = 2

[llm]
provider = "ollama"

[llm.ollama]
base_url = "http://gpu-box:11434"
model = "llama3.1:8b"
timeout_secs = 60
"#;

    let config = Config::from_toml_str(toml_content).unwrap();

    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.core.profile.to_str(), Some("/srv/eva/mira.json"));
    assert_eq!(config.memory.max_turns, 4);
    assert_eq!(config.generation.max_new_tokens, 120);
    assert_eq!(config.generation.top_k, 20);
    assert_eq!(config.generation.eos_token_id, Some(2));
    assert_eq!(config.llm.ollama.base_url, "http://gpu-box:11434");
    assert_eq!(config.llm.ollama.timeout_secs, 60);
}

#[test]
fn test_minimal_config_uses_defaults() {
    let config = Config::from_toml_str("[core]\n").unwrap();

    assert_eq!(config.core.log_level, "warn");
    assert!(config.core.profile.ends_with(".eva/profile.json"));
    assert!(!config.core.profile.starts_with("~"));
    assert_eq!(config.memory.max_turns, 6);
    assert_eq!(config.generation.max_new_tokens, 180);
    assert_eq!(config.generation.temperature, 0.7);
    assert_eq!(config.generation.top_p, 0.9);
    assert_eq!(config.generation.top_k, 50);
    assert!(config.generation.sampling_enabled);
    assert_eq!(config.generation.eos_token_id, None);
    assert_eq!(config.llm.provider, "ollama");
}

#[test]
fn test_load_from_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[core]
log_level = "warn"

[llm]
provider = "openai_compat"

[llm.openai_compat]
base_url = "http://localhost:8080/v1"
model = "mistral"
api_key_env = "MY_KEY"
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.core.log_level, "warn");
    assert_eq!(config.llm.provider, "openai_compat");
    assert_eq!(config.llm.openai_compat.model, "mistral");
    assert_eq!(config.llm.openai_compat.api_key_env, "MY_KEY");
}

#[test]
fn test_load_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let result = Config::load_from_path(&dir.path().join("absent.toml"));
    assert!(result.is_err());
}

#[test]
fn test_invalid_values_are_rejected() {
    let cases = [
        "[core]\nlog_level = \"loud\"\n",
        "[core]\n[memory]\nmax_turns = 0\n",
        "[core]\n[generation]\nmax_new_tokens = 0\n",
        "[core]\n[generation]\ntop_p = 0.0\n",
        "[core]\n[generation]\ntop_k = 0\n",
        "[core]\n[generation]\ntemperature = 3.0\n",
        "[core]\n[llm]\nprovider = \"gpt-cloud\"\n",
    ];

    for case in cases {
        assert!(
            Config::from_toml_str(case).is_err(),
            "Config should be rejected:\n{}",
            case
        );
    }
}

#[test]
fn test_greedy_allows_zero_temperature() {
    let config =
        Config::from_toml_str("[core]\n[generation]\nsampling_enabled = false\ntemperature = 0.0\n");
    assert!(config.is_ok());
}

#[test]
fn test_cli_overrides() {
    let mut config = Config::default_config();

    config
        .set_profile_path(std::path::Path::new("/tmp/other.json"))
        .unwrap();
    config.set_log_level("trace").unwrap();

    assert_eq!(config.core.profile.to_str(), Some("/tmp/other.json"));
    assert_eq!(config.core.log_level, "trace");
    assert!(config.set_log_level("shouty").is_err());
}

#[test]
fn test_default_config_round_trip() {
    let config = Config::default_config();
    let toml_string = toml::to_string_pretty(&config).unwrap();

    assert!(toml_string.contains("[core]"));
    assert!(toml_string.contains("[llm.ollama]"));

    let reparsed = Config::from_toml_str(&toml_string).unwrap();
    assert_eq!(reparsed.memory.max_turns, config.memory.max_turns);
    assert_eq!(reparsed.generation, config.generation);
    assert_eq!(reparsed.llm.ollama.model, config.llm.ollama.model);
}
