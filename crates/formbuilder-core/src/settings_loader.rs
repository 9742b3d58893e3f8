//! Settings loading from configuration files.
//!
//! This module provides functions to load [`Settings`] from TOML files, JSON
//! files, and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMBUILDER_SECRET_KEY` | `secret_key` |
//! | `FORMBUILDER_DEBUG` | `debug` |
//! | `FORMBUILDER_LOG_LEVEL` | `log_level` |
//! | `FORMBUILDER_TRANSLATION_NAMESPACE` | `translation_namespace` |
//! | `FORMBUILDER_DATETIME_FORMAT` | `datetime_format` |
//! | `FORMBUILDER_DATE_FORMAT` | `date_format` |
//! | `FORMBUILDER_CREATE_LABELS` | `create_labels` |
//! | `FORMBUILDER_SET_DEFAULT_VALUES` | `set_default_values` |
//! | `FORMBUILDER_ALLOW_ID` | `allow_id` |
//! | `FORMBUILDER_CSRF_PROTECTION` | `csrf_protection` |
//! | `FORMBUILDER_AUTO_MODE` | `auto_mode` |
//! | `FORMBUILDER_AUTO_DATA_SETTING` | `auto_data_setting` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use formbuilder_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/forms.toml").unwrap();
//! let settings = settings_loader::from_json_file_with_env("config/forms.json").unwrap();
//! ```

use std::path::Path;

use crate::error::{FormBuilderError, FormBuilderResult};
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> FormBuilderResult<Settings> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormBuilderError::SerializationError(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> FormBuilderResult<Settings> {
    let content = std::fs::read_to_string(path.as_ref())?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> FormBuilderResult<Settings> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> FormBuilderResult<Settings> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormBuilderError::SerializationError(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> FormBuilderResult<Settings> {
    let content = std::fs::read_to_string(path.as_ref())?;
    from_json_str(&content)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> FormBuilderResult<Settings> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `FORMBUILDER_*` environment variable overrides to a settings struct.
///
/// Boolean variables accept "true", "1" and "yes" (case-insensitive) as true;
/// anything else is false.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("FORMBUILDER_SECRET_KEY") {
        settings.secret_key = val;
    }
    if let Ok(val) = std::env::var("FORMBUILDER_LOG_LEVEL") {
        settings.log_level = val;
    }
    if let Ok(val) = std::env::var("FORMBUILDER_TRANSLATION_NAMESPACE") {
        settings.translation_namespace = val;
    }
    if let Ok(val) = std::env::var("FORMBUILDER_DATETIME_FORMAT") {
        settings.datetime_format = val;
    }
    if let Ok(val) = std::env::var("FORMBUILDER_DATE_FORMAT") {
        settings.date_format = val;
    }

    let flags: [(&str, &mut bool); 7] = [
        ("FORMBUILDER_DEBUG", &mut settings.debug),
        ("FORMBUILDER_CREATE_LABELS", &mut settings.create_labels),
        ("FORMBUILDER_SET_DEFAULT_VALUES", &mut settings.set_default_values),
        ("FORMBUILDER_ALLOW_ID", &mut settings.allow_id),
        ("FORMBUILDER_CSRF_PROTECTION", &mut settings.csrf_protection),
        ("FORMBUILDER_AUTO_MODE", &mut settings.auto_mode),
        ("FORMBUILDER_AUTO_DATA_SETTING", &mut settings.auto_data_setting),
    ];
    for (var, target) in flags {
        if let Ok(val) = std::env::var(var) {
            *target = parse_flag(&val);
        }
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(val.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

// ============================================================
// Helpers
// ============================================================

fn merge_over_defaults(value: serde_json::Value, format: &str) -> FormBuilderResult<Settings> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        FormBuilderError::SerializationError(format!("Failed to serialize default settings: {e}"))
    })?;
    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        FormBuilderError::SerializationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = match base_map.remove(&key) {
                    Some(base_v) => merge_json(base_v, override_v),
                    None => override_v,
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            secret_key = "my-secret-key"
            debug = false
            allow_id = true
            datetime_format = "%Y-%m-%d %H:%M"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.secret_key, "my-secret-key");
        assert!(!settings.debug);
        assert!(settings.allow_id);
        assert_eq!(settings.datetime_format, "%Y-%m-%d %H:%M");
        // Defaults preserved
        assert_eq!(settings.translation_namespace, "form");
        assert!(settings.csrf_protection);
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(matches!(result, Err(FormBuilderError::SerializationError(_))));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str("allow_id = \"sometimes\"");
        assert!(result.is_err());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "create_labels": false,
            "log_level": "debug"
        }"#;

        let settings = from_json_str(json).unwrap();
        assert!(!settings.create_labels);
        assert_eq!(settings.log_level, "debug");
        assert!(settings.set_default_values);
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{invalid json").is_err());
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = std::env::temp_dir().join("formbuilder_test_toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test_settings.toml");
        std::fs::write(&path, "csrf_protection = false\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert!(!settings.csrf_protection);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_json_file() {
        let dir = std::env::temp_dir().join("formbuilder_test_json");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test_settings.json");
        std::fs::write(&path, r#"{"auto_mode": false}"#).unwrap();

        let settings = from_json_file(&path).unwrap();
        assert!(!settings.auto_mode);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = from_toml_file("/nonexistent/path/forms.toml");
        assert!(matches!(result, Err(FormBuilderError::IoError(_))));
    }

    // ── Environment variable overrides ──────────────────────────────

    #[test]
    fn test_apply_env_overrides_strings() {
        let mut settings = Settings::default();
        std::env::set_var("FORMBUILDER_TRANSLATION_NAMESPACE", "forms");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.translation_namespace, "forms");
        std::env::remove_var("FORMBUILDER_TRANSLATION_NAMESPACE");
    }

    #[test]
    fn test_apply_env_overrides_flag() {
        let mut settings = Settings::default();
        std::env::set_var("FORMBUILDER_ALLOW_ID", "YES");
        apply_env_overrides(&mut settings);
        assert!(settings.allow_id);
        std::env::remove_var("FORMBUILDER_ALLOW_ID");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("Yes"));
        assert!(!parse_flag("no"));
        assert!(!parse_flag(""));
    }

    // ── merge_json helper ───────────────────────────────────────────

    #[test]
    fn test_merge_json_basic() {
        let base = serde_json::json!({"a": 1, "b": 2});
        let over = serde_json::json!({"b": 3, "c": 4});
        let merged = merge_json(base, over);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 3);
        assert_eq!(merged["c"], 4);
    }

    #[test]
    fn test_toml_to_json() {
        let toml_val: toml::Value = toml::from_str(
            r#"
            name = "test"
            flag = true
            [nested]
            key = "value"
        "#,
        )
        .unwrap();

        let json = toml_to_json(toml_val);
        assert_eq!(json["name"], "test");
        assert_eq!(json["flag"], true);
        assert_eq!(json["nested"]["key"], "value");
    }
}
