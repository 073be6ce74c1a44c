//! Eva Engine Library
//!
//! This library provides the core of the Eva persona chat: profile loading,
//! persona construction, bounded conversation memory, prompt assembly, text
//! generation and the session controller that ties them together.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Persona profile loading
pub mod profile;

/// Persona header construction
pub mod persona;

/// Conversation memory and prompt assembly
pub mod conversation;

/// Text generation backends and post-processing
pub mod llm;

/// Display surfaces
pub mod display;

/// Chat session controller
pub mod session;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;

/// Telemetry and observability module
pub mod telemetry;
