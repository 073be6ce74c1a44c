//! Persona Profile Store
//!
//! Static facts about the persona (name, tastes, traits) loaded once from a
//! JSON object and never mutated afterwards. Values may be plain scalars or
//! lists of strings; lists are flattened to comma-separated text when rendered.
//!
//! ```json
//! {
//!   "name": "Eva",
//!   "favorite_food": "ramen",
//!   "hobbies": ["chess", "hiking"]
//! }
//! ```

use sdk::errors::EngineError;
use sdk::types::HUMAN_LABEL;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A single profile attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    List(Vec<String>),
}

impl ProfileValue {
    /// Render the value as prompt text (lists become comma-joined)
    pub fn render(&self) -> String {
        match self {
            ProfileValue::Text(text) => text.clone(),
            ProfileValue::Number(number) => number.to_string(),
            ProfileValue::Flag(flag) => flag.to_string(),
            ProfileValue::List(items) => items.join(", "),
        }
    }
}

/// Immutable persona profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
    attributes: BTreeMap<String, ProfileValue>,
}

impl Profile {
    /// Load a profile from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object
    /// whose values are strings, numbers, booleans or lists of strings.
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            EngineError::Profile(format!("Failed to read profile {:?}: {}", path, e))
        })?;

        let profile = Self::from_json_str(&contents)?;
        tracing::debug!(
            "Loaded profile from {:?} ({} attributes)",
            path,
            profile.len()
        );

        Ok(profile)
    }

    /// Parse a profile from JSON text
    pub fn from_json_str(contents: &str) -> Result<Self, EngineError> {
        serde_json::from_str(contents)
            .map_err(|e| EngineError::Profile(format!("Failed to parse profile: {}", e)))
    }

    /// Build a profile from key/value pairs
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ProfileValue)>,
    {
        Self {
            attributes: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ProfileValue> {
        self.attributes.get(key)
    }

    /// The persona's name, when the profile carries a usable text `name`
    ///
    /// Blank names and the human speaker's label are not usable: the name
    /// labels the persona's turns in the transcript.
    pub fn name(&self) -> Option<&str> {
        match self.attributes.get("name") {
            Some(ProfileValue::Text(name)) => {
                let name = name.trim();
                if name.is_empty() || name.eq_ignore_ascii_case(HUMAN_LABEL) {
                    None
                } else {
                    Some(name)
                }
            }
            _ => None,
        }
    }

    /// Attributes in lexicographic key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProfileValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
