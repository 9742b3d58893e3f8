//! Translation catalog for loading and looking up messages.
//!
//! Translations can be loaded from JSON or registered programmatically.
//!
//! ## JSON Format
//!
//! ```json
//! {
//!   "messages": {
//!     "form.registration.name": "Name",
//!     "user.nameNotFilled": "Please fill in your name."
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::error::{FormBuilderError, FormBuilderResult};

/// A translation catalog for a single language.
#[derive(Debug, Clone, Default)]
pub struct TranslationCatalog {
    /// Simple message translations: key -> translated string.
    messages: HashMap<String, String>,
}

impl TranslationCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `(key, translated)` pairs, overwriting duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use formbuilder_core::i18n::TranslationCatalog;
    ///
    /// let mut catalog = TranslationCatalog::new();
    /// catalog.register(vec![("form.test.submit", "Send")]);
    /// assert_eq!(catalog.lookup("form.test.submit"), Some("Send"));
    /// ```
    pub fn register(&mut self, entries: Vec<(&str, &str)>) {
        for (key, translated) in entries {
            self.messages.insert(key.to_string(), translated.to_string());
        }
    }

    /// Looks up a translation.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Returns the number of registered messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the catalog holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Merges messages from a JSON string into this catalog.
    ///
    /// The `messages` key is optional; non-string values are skipped.
    pub fn load_from_json(&mut self, json_str: &str) -> FormBuilderResult<()> {
        let value: serde_json::Value = serde_json::from_str(json_str)
            .map_err(|e| FormBuilderError::SerializationError(format!("Invalid JSON: {e}")))?;

        if let Some(messages) = value.get("messages").and_then(|v| v.as_object()) {
            for (key, translated) in messages {
                if let Some(s) = translated.as_str() {
                    self.messages.insert(key.clone(), s.to_string());
                }
            }
        }
        Ok(())
    }

    /// Merges messages from a JSON file into this catalog.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> FormBuilderResult<()> {
        let content = std::fs::read_to_string(path.as_ref())?;
        self.load_from_json(&content)
    }
}
