//! Conversation turn types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used for the human participant in transcripts and prompts
pub const HUMAN_LABEL: &str = "Human";

/// Who a turn is attributed to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing into the front-end
    Human,

    /// The persona answering
    Agent,
}

impl Role {
    /// Transcript label for this role
    ///
    /// The agent is labelled with the persona's name, so the caller supplies it.
    pub fn label<'a>(&self, agent_name: &'a str) -> &'a str {
        match self {
            Role::Human => HUMAN_LABEL,
            Role::Agent => agent_name,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Human => write!(f, "human"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

/// One message in a conversation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    text: String,
}

impl Turn {
    /// Create a new turn
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    /// Create a human turn
    pub fn human(text: impl Into<String>) -> Self {
        Self::new(Role::Human, text)
    }

    /// Create an agent turn
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Role::Agent, text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_creation() {
        let human = Turn::human("Hello");
        assert_eq!(human.role(), Role::Human);
        assert_eq!(human.text(), "Hello");

        let agent = Turn::agent("Hi there");
        assert_eq!(agent.role(), Role::Agent);
        assert_eq!(agent.text(), "Hi there");
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::Human.label("Eva"), "Human");
        assert_eq!(Role::Agent.label("Eva"), "Eva");
        assert_eq!(Role::Agent.label("Nova"), "Nova");
    }

    #[test]
    fn test_turn_serialization() {
        let turn = Turn::agent("test");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains(r#""role":"agent""#));

        let deserialized: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(turn, deserialized);
    }
}
