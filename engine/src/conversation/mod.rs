//! Conversation state and prompt assembly
//!
//! This module holds the bounded conversation history and turns it, together
//! with the persona header, into the text sent to the language model.

pub mod memory;
pub mod prompt;

pub use memory::{ConversationMemory, DEFAULT_MAX_TURNS};
pub use prompt::{PromptAssembler, HUMAN_MARKER};
