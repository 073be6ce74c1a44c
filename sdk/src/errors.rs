//! Error types and handling
//!
//! This module provides the error types used throughout the Eva engine.
//! All errors implement the `EvaErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! Hints are shown verbatim on the display surface when a generation fails,
//! so they never contain raw provider output, URLs, or file paths.

use thiserror::Error;

/// Trait for Eva error extensions
pub trait EvaErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display in the chat transcript.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors leave the session usable; the user can simply send
    /// another message. Non-recoverable errors end the session.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration
/// - **Profile**: Persona profile missing or malformed
/// - **Generation**: The text generator failed or its worker died
/// - **Session**: The session event loop is gone
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, EvaErrorExt};
///
/// let error = EngineError::Generation("connection refused".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::SessionClosed;
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Profile errors
    #[error("Profile error: {0}")]
    Profile(String),

    // Generation errors
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Generation worker failed: {0}")]
    WorkerFailed(String),

    // Session errors
    #[error("Session event loop is closed")]
    SessionClosed,

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EvaErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            // Configuration errors
            Self::Config(_) => "Check your config.toml file for errors",

            // Profile errors
            Self::Profile(_) => "Check your profile.json file for errors",

            // Generation errors
            Self::Generation(_) => "The language model did not answer. Check that it is running",
            Self::WorkerFailed(_) => "The reply could not be generated. Try again",

            // Session errors
            Self::SessionClosed => "The chat session has ended",

            // Generic IO error
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::SessionClosed => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad value");

        let err = EngineError::WorkerFailed("panicked".to_string());
        assert_eq!(err.to_string(), "Generation worker failed: panicked");
    }

    #[test]
    fn test_user_hints_do_not_leak_details() {
        let err = EngineError::Generation("http://10.0.0.5:11434 refused".to_string());
        assert!(!err.user_hint().contains("10.0.0.5"));

        let err = EngineError::Profile("/home/me/profile.json".to_string());
        assert!(!err.user_hint().contains("/home/me"));
    }

    #[test]
    fn test_recoverability() {
        assert!(EngineError::Generation("x".to_string()).is_recoverable());
        assert!(EngineError::WorkerFailed("x".to_string()).is_recoverable());
        assert!(!EngineError::SessionClosed.is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EngineError = io.into();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
