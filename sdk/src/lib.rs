//! Eva SDK
//!
//! Shared contract types for the Eva chat engine: conversation turns, the
//! display surface trait, and the error taxonomy. Front-ends that render a
//! session only need to depend on this crate.

/// Display surface trait and line types
pub mod display;

/// Error types and handling
pub mod errors;

/// Conversation turn types
pub mod types;

// Re-export commonly used types
pub use display::{DisplayLine, DisplaySurface, Speaker};
pub use errors::{EngineError, EvaErrorExt};
pub use types::{Role, Turn, HUMAN_LABEL};
