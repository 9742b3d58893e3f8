//! Translation support for generated labels and rule messages.
//!
//! The form builder never formats user-facing text itself. Every label and
//! every rule message is passed through a [`Translator`] together with its
//! placeholder parameters. [`CatalogTranslator`] is the bundled
//! implementation backed by an in-memory [`TranslationCatalog`].
//!
//! ## Quick Start
//!
//! ```
//! use formbuilder_core::i18n::{CatalogTranslator, Params, Translator};
//!
//! let translator = CatalogTranslator::new("en")
//!     .with_translations(vec![("form.test.name", "Name")]);
//!
//! assert_eq!(translator.translate("form.test.name", &Params::new()), "Name");
//!
//! let params = Params::new().with("value", 3);
//! assert_eq!(
//!     translator.translate("At least %value% characters.", &params),
//!     "At least 3 characters."
//! );
//! ```

pub mod catalog;

use std::collections::BTreeMap;
use std::fmt;

pub use catalog::TranslationCatalog;

/// Placeholder parameters passed along with a translation key.
///
/// Each entry replaces `%name%` in the translated string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a placeholder, returning the updated set.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.0.insert(name.into(), value.to_string());
        self
    }

    /// Adds a placeholder in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.0.insert(name.into(), value.to_string());
    }

    /// Returns the value of a placeholder, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns `true` if no placeholders are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the placeholders in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: fmt::Display> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

/// The translation collaborator consumed by the form builder.
///
/// Implementations must return the key itself (after placeholder
/// substitution) when they have no translation for it.
pub trait Translator: Send + Sync {
    /// Translates `key`, substituting `%name%` placeholders from `params`.
    fn translate(&self, key: &str, params: &Params) -> String;
}

impl<T: Translator + ?Sized> Translator for std::sync::Arc<T> {
    fn translate(&self, key: &str, params: &Params) -> String {
        (**self).translate(key, params)
    }
}

/// Replaces every `%name%` occurrence in `template` with its parameter value.
///
/// Unknown placeholders are left untouched.
pub fn substitute(template: &str, params: &Params) -> String {
    if params.is_empty() || !template.contains('%') {
        return template.to_string();
    }
    params.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("%{name}%"), value)
    })
}

/// A translator backed by a single-language [`TranslationCatalog`].
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    language: String,
    catalog: TranslationCatalog,
}

impl CatalogTranslator {
    /// Creates a translator for `language` with an empty catalog.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            catalog: TranslationCatalog::default(),
        }
    }

    /// Creates a translator from an existing catalog.
    pub fn from_catalog(language: impl Into<String>, catalog: TranslationCatalog) -> Self {
        Self {
            language: language.into(),
            catalog,
        }
    }

    /// Registers `(key, translation)` pairs, returning the translator.
    #[must_use]
    pub fn with_translations(mut self, entries: Vec<(&str, &str)>) -> Self {
        self.catalog.register(entries);
        self
    }

    /// Returns the language code this translator serves.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the underlying catalog for further registration.
    pub fn catalog_mut(&mut self) -> &mut TranslationCatalog {
        &mut self.catalog
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, key: &str, params: &Params) -> String {
        let template = self.catalog.lookup(key).unwrap_or(key);
        substitute(template, params)
    }
}
