//! Core error types for the formbuilder workspace.
//!
//! This module provides the error enum [`FormBuilderError`] shared by every
//! crate in the workspace, and [`ValidationError`], the value a constraint
//! validator produces when it rejects a value.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// A single rejected value, as reported by a constraint validator.
///
/// # Examples
///
/// ```
/// use formbuilder_core::error::ValidationError;
///
/// let err = ValidationError::new("The value is too short.", "min_length")
///     .with_param("value", "3");
/// assert_eq!(err.params.get("value").map(String::as_str), Some("3"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The message template, usually a translation key or a human-readable sentence.
    pub message: String,
    /// A short code identifying the type of validation failure (e.g. "filled", "pattern").
    pub code: String,
    /// Placeholder values the message may reference (`%name%`).
    pub params: BTreeMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a placeholder parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for the formbuilder workspace.
///
/// All variants are local, synchronous failures. Nothing retries and nothing
/// is recovered internally; every error surfaces at the call that violated
/// the precondition.
#[derive(Error, Debug)]
pub enum FormBuilderError {
    // ── Builder configuration ────────────────────────────────────────

    /// The builder is missing something it needs (main entity, translator)
    /// or was asked to do something its current configuration forbids.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A property, relation, entity, or control referenced by name does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    // ── Values ───────────────────────────────────────────────────────

    /// A value could not be converted to the type of the target attribute.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A constraint validator rejected a value.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Settings ─────────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ValidationError> for FormBuilderError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

impl FormBuilderError {
    /// Returns `true` for [`FormBuilderError::ConfigurationError`].
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError(_))
    }

    /// Returns `true` for [`FormBuilderError::InvalidReference`].
    pub const fn is_invalid_reference(&self) -> bool {
        matches!(self, Self::InvalidReference(_))
    }
}

/// A convenience type alias for `Result<T, FormBuilderError>`.
pub type FormBuilderResult<T> = Result<T, FormBuilderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("The value must be filled.", "filled");
        assert_eq!(err.to_string(), "The value must be filled.");
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("Too short.", "min_length").with_param("value", "8");
        assert_eq!(err.params.get("value").unwrap(), "8");
    }

    #[test]
    fn test_error_display() {
        let err = FormBuilderError::InvalidReference("property 'foo'".into());
        assert_eq!(err.to_string(), "Invalid reference: property 'foo'");

        let err = FormBuilderError::ConfigurationError("no main entity".into());
        assert_eq!(err.to_string(), "Configuration error: no main entity");
    }

    #[test]
    fn test_error_kind_predicates() {
        assert!(FormBuilderError::ConfigurationError("x".into()).is_configuration());
        assert!(!FormBuilderError::ConfigurationError("x".into()).is_invalid_reference());
        assert!(FormBuilderError::InvalidReference("x".into()).is_invalid_reference());
        assert!(!FormBuilderError::InvalidValue("x".into()).is_configuration());
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: FormBuilderError = ValidationError::new("bad", "pattern").into();
        assert!(matches!(err, FormBuilderError::ValidationError(ref v) if v.code == "pattern"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FormBuilderError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }
}
