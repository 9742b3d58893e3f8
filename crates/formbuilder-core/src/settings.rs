//! Builder settings.
//!
//! This module provides the [`Settings`] struct, which carries the default
//! configuration every form builder starts from. Individual builders can
//! override any of these through their setters.

use serde::{Deserialize, Serialize};

/// The complete set of form builder settings.
///
/// # Examples
///
/// ```
/// use formbuilder_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.create_labels);
/// assert_eq!(settings.translation_namespace, "form");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logging).
    pub debug: bool,
    /// The log filter directive (e.g. "info", "formbuilder_forms=trace").
    pub log_level: String,
    /// The key used to sign CSRF protection tokens.
    pub secret_key: String,

    // ── Labels and translation ───────────────────────────────────────

    /// The first segment of every generated translation key.
    pub translation_namespace: String,
    /// Whether labels are generated through the translator.
    pub create_labels: bool,

    // ── Default values ───────────────────────────────────────────────

    /// Whether controls are pre-filled from the entity's current values.
    pub set_default_values: bool,
    /// The chrono format used for date-time default values.
    pub datetime_format: String,
    /// The chrono format used for date default values.
    pub date_format: String,

    // ── Materialization ──────────────────────────────────────────────

    /// Whether the main entity's identifier is exposed as a hidden control.
    pub allow_id: bool,
    /// Whether a CSRF protection field is appended.
    pub csrf_protection: bool,
    /// Whether property metadata is derived automatically for every entity.
    pub auto_mode: bool,
    /// Whether submitted values are written back onto the entities.
    pub auto_data_setting: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Core
            debug: true,
            log_level: "info".to_string(),
            secret_key: String::new(),

            // Labels
            translation_namespace: "form".to_string(),
            create_labels: true,

            // Defaults
            set_default_values: true,
            datetime_format: "%d.%m.%Y %H:%M:%S".to_string(),
            date_format: "%d.%m.%Y".to_string(),

            // Materialization
            allow_id: false,
            csrf_protection: true,
            auto_mode: true,
            auto_data_setting: true,
        }
    }
}

impl Settings {
    /// Returns settings with CSRF protection and label generation disabled.
    ///
    /// Useful for tests and for forms rendered without a translator.
    #[must_use]
    pub fn bare() -> Self {
        Self {
            create_labels: false,
            csrf_protection: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.translation_namespace, "form");
        assert_eq!(s.datetime_format, "%d.%m.%Y %H:%M:%S");
        assert_eq!(s.date_format, "%d.%m.%Y");
        assert!(s.create_labels);
        assert!(s.set_default_values);
        assert!(!s.allow_id);
        assert!(s.csrf_protection);
        assert!(s.auto_mode);
        assert!(s.auto_data_setting);
        assert!(s.secret_key.is_empty());
    }

    #[test]
    fn test_bare_settings() {
        let s = Settings::bare();
        assert!(!s.create_labels);
        assert!(!s.csrf_protection);
        assert!(s.set_default_values);
    }

    #[test]
    fn test_settings_serde_roundtrip() {
        let s = Settings {
            allow_id: true,
            ..Settings::default()
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
