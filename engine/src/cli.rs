//! CLI interface for Eva
//!
//! This module provides the command-line interface using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Eva persona chat
///
/// Chats with a locally served language model that answers as the persona
/// described in a JSON profile. Type `/clear` to clear the screen and
/// `/reset` to make the persona forget the conversation.
#[derive(Parser, Debug)]
#[command(name = "eva")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Persona profile to load instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive chat (default)
    Chat,

    /// Print the persona header built from the profile
    Persona,

    /// Print the prompt that would be sent for a first message
    Prompt {
        /// The user message
        message: String,
    },

    /// Check configuration, profile and model availability
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["eva"]);
        assert!(cli.command.is_none());
        assert!(!cli.json);
        assert!(cli.log.is_none());
        assert!(cli.config.is_none());
        assert!(cli.profile.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "eva", "check", "--json", "--log", "debug", "--profile", "p.json",
        ]);
        assert!(matches!(cli.command, Some(Command::Check)));
        assert!(cli.json);
        assert_eq!(cli.log, Some("debug".to_string()));
        assert_eq!(cli.profile, Some(PathBuf::from("p.json")));
    }

    #[test]
    fn test_prompt_command() {
        let cli = Cli::parse_from(["eva", "prompt", "how are you?"]);
        if let Some(Command::Prompt { message }) = cli.command {
            assert_eq!(message, "how are you?");
        } else {
            panic!("Expected Prompt command");
        }
    }

    #[test]
    fn test_chat_and_persona() {
        let cli = Cli::parse_from(["eva", "--config", "/tmp/eva.toml", "chat"]);
        assert!(matches!(cli.command, Some(Command::Chat)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/eva.toml")));

        let cli = Cli::parse_from(["eva", "persona"]);
        assert!(matches!(cli.command, Some(Command::Persona)));
    }
}
