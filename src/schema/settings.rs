use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-project string escaping for free-text values embedded in exported
/// code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub escape_character: String,
    /// Every character in this string gets `escape_character` prepended.
    pub escaped_characters: String,
    /// Replacement for line breaks in escaped text.
    pub newline_character: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            escape_character: "\\".to_string(),
            escaped_characters: "\"".to_string(),
            newline_character: "\\n".to_string(),
        }
    }
}

impl ExportSettings {
    pub fn load_from_ron(path: &Path) -> Result<ExportSettings, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    /// Escapes a free-text value so it can sit inside a string literal of
    /// the target language.
    pub fn escape(&self, value: &str) -> String {
        let mut escaped = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\r' {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                escaped.push_str(&self.newline_character);
            } else if c == '\n' {
                escaped.push_str(&self.newline_character);
            } else {
                if self.escaped_characters.contains(c) {
                    escaped.push_str(&self.escape_character);
                }
                escaped.push(c);
            }
        }
        escaped
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}
