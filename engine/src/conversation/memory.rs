//! Conversation Memory
//!
//! Bounded, chronological log of turns. The memory holds at most
//! `2 × max_turns` entries (one human and one agent turn per exchange). When an
//! append pushes it over that cap, the oldest two entries are dropped. Turns are
//! only ever committed in human/agent pairs, so eviction never splits a pair.

use sdk::types::{Role, Turn};
use std::collections::VecDeque;

/// Default number of exchanges kept
pub const DEFAULT_MAX_TURNS: usize = 6;

/// Bounded conversation history
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    /// Turns in chronological order
    turns: VecDeque<Turn>,

    /// Number of exchanges (human + agent pairs) retained
    max_turns: usize,

    /// Label rendered for agent turns
    agent_name: String,
}

impl ConversationMemory {
    /// Create an empty memory retaining `max_turns` exchanges
    pub fn new(max_turns: usize, agent_name: impl Into<String>) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_turns * 2 + 1),
            max_turns,
            agent_name: agent_name.into(),
        }
    }

    /// Append one turn, evicting the oldest pair if the cap is exceeded
    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.turns.push_back(Turn::new(role, text));

        if self.turns.len() > self.capacity() {
            let evicted = self.turns.len().min(2);
            self.turns.drain(..evicted);
            tracing::debug!(
                "Conversation memory full, evicted oldest exchange ({} turns kept)",
                self.turns.len()
            );
        }
    }

    /// Transcript as `"{role}: {text}"` lines, oldest first
    ///
    /// An empty memory renders as an empty string.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("{}: {}", turn.role().label(&self.agent_name), turn.text()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop every turn
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// Maximum number of stored turns
    fn capacity(&self) -> usize {
        self.max_turns * 2
    }
}
