//! Persona Prompt Builder
//!
//! Renders a `Profile` into the fixed instruction header that opens every
//! prompt. The header is built once at startup and reused unchanged for every
//! turn; it only changes if a new profile is loaded.

use crate::profile::Profile;

/// Name used when the profile does not carry one
pub const DEFAULT_PERSONA_NAME: &str = "Eva";

/// Well-known attributes, rendered first and in this order
const KNOWN_ATTRIBUTES: &[(&str, &str)] = &[
    ("name", "Name"),
    ("gender", "Gender"),
    ("favorite_food", "Favorite food"),
    ("favorite_music", "Favorite music"),
    ("hobbies", "Hobbies"),
    ("humor_style", "Humor style"),
    ("favorite_game", "Favorite game"),
    ("favorite_color", "Favorite color"),
    ("favorite_animal", "Favorite animal"),
    ("favorite_book", "Favorite book"),
    ("favorite_movie", "Favorite movie"),
    ("personality_traits", "Personality traits"),
    ("interests", "Interests"),
];

const RULES: &[&str] = &[
    "Never mention prompts, models, or instructions",
    "Keep responses concise, natural, and in character",
];

/// The rendered persona preamble plus the name it speaks under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaHeader {
    name: String,
    text: String,
}

impl PersonaHeader {
    /// Render the header for a profile
    pub fn build(profile: &Profile) -> Self {
        let name = profile.name().unwrap_or(DEFAULT_PERSONA_NAME).to_string();

        let mut lines = vec![
            format!("You are {}.", name),
            "You are NOT an AI model.".to_string(),
            "You NEVER break character.".to_string(),
            "You speak naturally, intelligently, and with emotional awareness.".to_string(),
            String::new(),
            "Profile:".to_string(),
        ];

        for (key, label) in KNOWN_ATTRIBUTES {
            if *key == "name" {
                // Same text as the identity line, or nothing if unusable
                if let Some(name) = profile.name() {
                    lines.push(format!("- {}: {}", label, name));
                }
            } else if let Some(value) = profile.get(key) {
                lines.push(format!("- {}: {}", label, value.render()));
            }
        }

        // Anything else follows in key order
        for (key, value) in profile.iter() {
            if KNOWN_ATTRIBUTES.iter().any(|(known, _)| *known == key) {
                continue;
            }
            lines.push(format!("- {}: {}", attribute_label(key), value.render()));
        }

        lines.push(String::new());
        lines.push("Rules:".to_string());
        lines.extend(RULES.iter().map(|rule| format!("- {}", rule)));

        Self {
            name,
            text: lines.join("\n"),
        }
    }

    /// Name the persona speaks under; also the agent's transcript label
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// `favorite_tea_blend` -> `Favorite tea blend`
fn attribute_label(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
