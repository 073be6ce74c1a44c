//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - chat: Interactive terminal session
//! - persona: Show the persona header built from the profile
//! - prompt: Show the prompt a first message would produce
//! - check: Validate configuration and check the generator

use anyhow::{Context, Result};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::config::Config;
use crate::conversation::{ConversationMemory, PromptAssembler};
use crate::display::TerminalDisplay;
use crate::llm::{generator_from_config, GenerationPipeline};
use crate::persona::PersonaHeader;
use crate::profile::Profile;
use crate::session::{SessionController, SessionStats};

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Load the configured profile and build the persona header from it
pub fn load_persona(config: &Config) -> Result<PersonaHeader> {
    let profile = Profile::load_from_path(&config.core.profile)
        .with_context(|| format!("Failed to load profile {:?}", config.core.profile))?;

    let header = PersonaHeader::build(&profile);
    tracing::info!(
        "Persona '{}' built from {} profile attributes",
        header.name(),
        profile.len()
    );

    Ok(header)
}

/// Run an interactive chat on the terminal
pub async fn handle_chat(config: &Config) -> Result<()> {
    use std::io::IsTerminal;

    let assembler = PromptAssembler::new(load_persona(config)?);
    let generator = generator_from_config(&config.llm)?;
    let pipeline = Arc::new(GenerationPipeline::new(
        generator,
        config.generation.clone(),
    ));

    if !pipeline.check_health().await {
        tracing::warn!(
            "Generator '{}' is not reachable; replies will fail until it is",
            pipeline.generator_name()
        );
    }

    if std::io::stdin().is_terminal() {
        println!(
            "Chatting with {}. /clear clears the screen, /reset forgets the conversation, Ctrl-D quits.",
            assembler.agent_name()
        );
    }

    let controller = SessionController::new(
        assembler,
        config.memory.max_turns,
        pipeline,
        Box::new(TerminalDisplay::stdout()),
    );
    let stats = run_chat(tokio::io::stdin(), controller).await?;

    tracing::info!(
        "Chat ended after {} exchanges ({} empty, {} failed)",
        stats.exchanges_committed,
        stats.empty_results_dropped,
        stats.generation_faults
    );

    Ok(())
}

/// Feed `input` to a session line by line until end of input
///
/// Each line is only read once the previous one has been handled, so a reply
/// is always on screen before the next message goes out. The session is shut
/// down and awaited even when reading fails.
pub async fn run_chat<R>(input: R, controller: SessionController) -> Result<SessionStats>
where
    R: AsyncRead + Unpin,
{
    let handle = controller.handle();
    let session = tokio::spawn(controller.run());

    let mut lines = BufReader::new(input).lines();
    let read_result = loop {
        match lines.next_line().await {
            Ok(Some(line)) => handle.submit_and_wait(line).await?,
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    handle.shutdown().await?;
    let stats = session.await.context("Session task failed")?;

    read_result.context("Failed to read input")?;
    Ok(stats)
}

/// Print the persona header
pub fn handle_persona(config: &Config, format: OutputFormat) -> Result<()> {
    let header = load_persona(config)?;

    match format {
        OutputFormat::Text => println!("{}", header.as_str()),
        OutputFormat::Json => {
            let output = json!({
                "name": header.name(),
                "header": header.as_str(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Print the prompt that `message` would produce as the first message of a
/// session
pub fn handle_prompt(message: &str, config: &Config, format: OutputFormat) -> Result<()> {
    let assembler = PromptAssembler::new(load_persona(config)?);
    let memory = ConversationMemory::new(config.memory.max_turns, assembler.agent_name());
    let prompt = assembler.build(&memory, message.trim());

    match format {
        OutputFormat::Text => println!("{}", prompt),
        OutputFormat::Json => {
            let output = json!({ "prompt": prompt });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Run diagnostics on configuration, profile and generator
pub async fn handle_check(config: &Config, format: OutputFormat) -> Result<()> {
    let mut issues = Vec::new();
    let mut checks: Vec<(&str, String)> = Vec::new();

    // Config is already validated when loaded
    checks.push(("Configuration", "Valid".to_string()));

    match Profile::load_from_path(&config.core.profile) {
        Ok(profile) => {
            let header = PersonaHeader::build(&profile);
            checks.push(("Profile", format!("{} attributes", profile.len())));
            checks.push(("Persona", header.name().to_string()));
        }
        Err(e) => {
            checks.push(("Profile", "Unusable".to_string()));
            issues.push(format!("{:?}: {}", config.core.profile, e));
        }
    }

    match generator_from_config(&config.llm) {
        Ok(generator) => {
            checks.push(("Generator", generator.name().to_string()));
            if generator.check_health().await {
                checks.push(("Generator status", "Reachable".to_string()));
            } else {
                checks.push(("Generator status", "Unreachable".to_string()));
                issues.push(format!(
                    "The '{}' backend did not respond. Is it running?",
                    config.llm.provider
                ));
            }
        }
        Err(e) => {
            checks.push(("Generator", "Error".to_string()));
            issues.push(e.to_string());
        }
    }

    match format {
        OutputFormat::Text => {
            println!("Eva Diagnostics");
            println!("===============");
            println!();

            for (check, status) in &checks {
                println!("  {:<20} {}", format!("{}:", check), status);
            }

            println!();

            if issues.is_empty() {
                println!("✓ All checks passed!");
            } else {
                println!("⚠ Issues found:");
                println!();
                for (i, issue) in issues.iter().enumerate() {
                    println!("  {}. {}", i + 1, issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": checks.iter().map(|(name, status)| {
                    json!({
                        "name": name,
                        "status": status
                    })
                }).collect::<Vec<_>>(),
                "issues": issues,
                "healthy": issues.is_empty()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
