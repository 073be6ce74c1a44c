//! Display surface contract
//!
//! The session controller never renders anything itself. It talks to a
//! `DisplaySurface`, which may be a terminal, a GUI widget, or an in-memory
//! recorder in tests. Surfaces are driven from a single context only, so the
//! trait takes `&mut self` and needs no internal locking.

use serde::{Deserialize, Serialize};

/// Visual category of a display line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// Message typed by the user
    Human,

    /// Reply from the persona
    Agent,

    /// Notice emitted by the session itself (reset, errors)
    System,

    /// Transient "is typing" indicator
    Indicator,
}

/// A single line handed to a display surface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayLine {
    pub speaker: Speaker,

    /// Name shown before the text (e.g. "Human", "Eva", "System")
    pub label: String,

    pub text: String,
}

impl DisplayLine {
    pub fn new(speaker: Speaker, label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker,
            label: label.into(),
            text: text.into(),
        }
    }

    /// Create a system notice
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Speaker::System, "System", text)
    }

    /// Create the typing indicator for the named persona
    pub fn indicator(agent_name: &str) -> Self {
        Self::new(
            Speaker::Indicator,
            agent_name,
            format!("{} is typing...", agent_name),
        )
    }

    /// Whether this line is removed again by `remove_last_transient_line`
    pub fn is_transient(&self) -> bool {
        self.speaker == Speaker::Indicator
    }
}

/// Rendering surface consumed by the session controller
pub trait DisplaySurface: Send {
    /// Append a line at the end of the visible transcript
    fn append_line(&mut self, line: DisplayLine);

    /// Remove the most recent transient line, if one is showing
    fn remove_last_transient_line(&mut self);

    /// Erase everything currently visible
    fn clear_all(&mut self);
}
