// Eva persona chat
// Main entry point for the eva binary

use clap::Parser;
use eva_engine::cli::{Cli, Command};
use eva_engine::config::Config;
use eva_engine::handlers::{
    handle_chat, handle_check, handle_persona, handle_prompt, OutputFormat,
};
use eva_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let mut config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    if let Some(profile) = &cli.profile {
        config.set_profile_path(profile)?;
    }
    if let Some(level) = &cli.log {
        config.set_log_level(level)?;
    }

    // Config-driven log level (RUST_LOG still wins)
    init_telemetry_with_level(&config.core.log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Eva v{} ({} - {})", version, commit, timestamp);

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => handle_chat(&config).await,
        Command::Persona => handle_persona(&config, format),
        Command::Prompt { message } => handle_prompt(&message, &config, format),
        Command::Check => {
            tracing::info!("Running diagnostics...");
            handle_check(&config, format).await
        }
    }
}
