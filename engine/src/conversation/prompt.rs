//! Prompt Assembler
//!
//! Joins the persona header, the transcript so far and a trailing cue for the
//! new exchange into the single string handed to the text generator:
//!
//! ```text
//! {persona header}
//!
//! Conversation so far:
//! Human: ...
//! Eva: ...
//!
//! Human: {user input}
//! Eva:
//! ```
//!
//! The "Conversation so far" section is left out entirely while memory is empty.
//! The cue starts with [`HUMAN_MARKER`], the same string the generation pipeline
//! truncates on, so a model that runs on into the next human turn is cut there.

use super::memory::ConversationMemory;
use crate::persona::PersonaHeader;

/// Marker that opens a human turn in prompts and in raw completions
pub const HUMAN_MARKER: &str = "Human:";

const HISTORY_HEADING: &str = "Conversation so far:";

/// Builds generation prompts around a fixed persona header
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    header: PersonaHeader,
}

impl PromptAssembler {
    pub fn new(header: PersonaHeader) -> Self {
        Self { header }
    }

    pub fn header(&self) -> &PersonaHeader {
        &self.header
    }

    /// Name of the persona, used as the agent label
    pub fn agent_name(&self) -> &str {
        self.header.name()
    }

    /// Assemble the prompt for a new user message
    pub fn build(&self, memory: &ConversationMemory, user_input: &str) -> String {
        let mut prompt =
            String::with_capacity(self.header.as_str().len() + user_input.len() + 256);

        prompt.push_str(self.header.as_str());
        prompt.push_str("\n\n");

        let transcript = memory.render();
        if !transcript.is_empty() {
            prompt.push_str(HISTORY_HEADING);
            prompt.push('\n');
            prompt.push_str(&transcript);
            prompt.push_str("\n\n");
        }

        prompt.push_str(HUMAN_MARKER);
        prompt.push(' ');
        prompt.push_str(user_input);
        prompt.push('\n');
        prompt.push_str(self.agent_name());
        prompt.push(':');

        prompt
    }
}
