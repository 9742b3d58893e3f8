//! Constraint validators.
//!
//! One validator per rule kind. Each is a pure predicate over a [`Value`];
//! the form layer decides when to run it and which message to report.

use std::fmt;
use std::sync::OnceLock;

use formbuilder_core::{FormBuilderError, FormBuilderResult, ValidationError};
use regex::Regex;

use crate::constraints::{RuleKind, RuleParams};
use crate::value::Value;

/// A trait for validating control values.
///
/// # Examples
///
/// ```
/// use formbuilder_meta::validators::{LengthValidator, Validator};
/// use formbuilder_meta::value::Value;
///
/// let v = LengthValidator::at_least(3);
/// assert!(v.validate(&Value::from("abc")).is_ok());
/// assert!(v.validate(&Value::from("ab")).is_err());
/// ```
pub trait Validator: Send + Sync + fmt::Debug {
    /// Returns `true` if the value satisfies this validator.
    fn is_valid(&self, value: &Value) -> bool;

    /// Returns a short code identifying the check.
    fn code(&self) -> &'static str;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;

    /// Validates the given value, returning an error if invalid.
    fn validate(&self, value: &Value) -> FormBuilderResult<()> {
        if self.is_valid(value) {
            Ok(())
        } else {
            Err(FormBuilderError::ValidationError(
                ValidationError::new(format!("{} rejected the value.", self.name()), self.code())
                    .with_param("value", value.to_form_string()),
            ))
        }
    }
}

/// Builds the validator for a rule kind and its parameters.
///
/// Fails with [`FormBuilderError::InvalidValue`] when the parameters do not
/// fit the kind (e.g. a pattern that does not compile).
pub fn validator_for(kind: RuleKind, params: &RuleParams) -> FormBuilderResult<Box<dyn Validator>> {
    let validator: Box<dyn Validator> = match kind {
        RuleKind::Required => Box::new(FilledValidator),
        RuleKind::MinLength => Box::new(LengthValidator::at_least(length_param(kind, params)?)),
        RuleKind::MaxLength => Box::new(LengthValidator::at_most(length_param(kind, params)?)),
        RuleKind::Length => match params {
            RuleParams::Range { min, max } => Box::new(LengthValidator::new(
                min.as_ref().map(|v| to_length(kind, v)).transpose()?,
                max.as_ref().map(|v| to_length(kind, v)).transpose()?,
            )),
            _ => Box::new(LengthValidator::exact(length_param(kind, params)?)),
        },
        RuleKind::Range => match params {
            RuleParams::Range { min, max } => Box::new(RangeValidator::new(
                min.as_ref().map(|v| to_number(kind, v)).transpose()?,
                max.as_ref().map(|v| to_number(kind, v)).transpose()?,
            )),
            _ => return Err(bad_params(kind, params)),
        },
        RuleKind::Min => Box::new(RangeValidator::new(Some(number_param(kind, params)?), None)),
        RuleKind::Max => Box::new(RangeValidator::new(None, Some(number_param(kind, params)?))),
        RuleKind::Pattern => {
            let pattern = params
                .value()
                .and_then(Value::as_str)
                .ok_or_else(|| bad_params(kind, params))?;
            Box::new(PatternValidator::new(pattern)?)
        }
        RuleKind::Email => Box::new(EmailValidator),
        RuleKind::Url => Box::new(UrlValidator),
        RuleKind::Integer => Box::new(IntegerValidator),
        RuleKind::Float => Box::new(FloatValidator),
    };
    Ok(validator)
}

fn bad_params(kind: RuleKind, params: &RuleParams) -> FormBuilderError {
    FormBuilderError::InvalidValue(format!("Invalid parameters for rule '{kind}': {params:?}"))
}

fn to_length(kind: RuleKind, value: &Value) -> FormBuilderResult<usize> {
    value
        .as_int()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| bad_params(kind, &RuleParams::Value(value.clone())))
}

fn to_number(kind: RuleKind, value: &Value) -> FormBuilderResult<f64> {
    value
        .to_number()
        .ok_or_else(|| bad_params(kind, &RuleParams::Value(value.clone())))
}

fn length_param(kind: RuleKind, params: &RuleParams) -> FormBuilderResult<usize> {
    params
        .value()
        .ok_or_else(|| bad_params(kind, params))
        .and_then(|v| to_length(kind, v))
}

fn number_param(kind: RuleKind, params: &RuleParams) -> FormBuilderResult<f64> {
    params
        .value()
        .ok_or_else(|| bad_params(kind, params))
        .and_then(|v| to_number(kind, v))
}

fn text_of(value: &Value) -> String {
    value.to_form_string()
}

// ── Validators ─────────────────────────────────────────────────────────

/// Validates that a value is filled.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilledValidator;

impl Validator for FilledValidator {
    fn is_valid(&self, value: &Value) -> bool {
        value.is_filled()
    }

    fn code(&self) -> &'static str {
        "filled"
    }

    fn name(&self) -> &str {
        "FilledValidator"
    }
}

/// Validates the length of a value in characters, inclusive on both ends.
#[derive(Debug, Clone, Copy)]
pub struct LengthValidator {
    /// The minimum length, if bounded.
    pub min: Option<usize>,
    /// The maximum length, if bounded.
    pub max: Option<usize>,
}

impl LengthValidator {
    /// Creates a validator for the given bounds.
    pub const fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// Exactly `n` characters.
    pub const fn exact(n: usize) -> Self {
        Self::new(Some(n), Some(n))
    }

    /// At least `n` characters.
    pub const fn at_least(n: usize) -> Self {
        Self::new(Some(n), None)
    }

    /// At most `n` characters.
    pub const fn at_most(n: usize) -> Self {
        Self::new(None, Some(n))
    }
}

impl Validator for LengthValidator {
    fn is_valid(&self, value: &Value) -> bool {
        let len = text_of(value).chars().count();
        self.min.map_or(true, |min| len >= min) && self.max.map_or(true, |max| len <= max)
    }

    fn code(&self) -> &'static str {
        "length"
    }

    fn name(&self) -> &str {
        "LengthValidator"
    }
}

/// Validates that a numeric value lies in a range, inclusive on both ends.
#[derive(Debug, Clone, Copy)]
pub struct RangeValidator {
    /// The lower bound, if any.
    pub min: Option<f64>,
    /// The upper bound, if any.
    pub max: Option<f64>,
}

impl RangeValidator {
    /// Creates a validator for the given bounds.
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

impl Validator for RangeValidator {
    fn is_valid(&self, value: &Value) -> bool {
        value.to_number().is_some_and(|n| {
            self.min.map_or(true, |min| n >= min) && self.max.map_or(true, |max| n <= max)
        })
    }

    fn code(&self) -> &'static str {
        "range"
    }

    fn name(&self) -> &str {
        "RangeValidator"
    }
}

/// Validates that the whole value matches a regular expression.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    regex: Regex,
}

impl PatternValidator {
    /// Compiles `pattern`, anchored to the whole value.
    pub fn new(pattern: &str) -> FormBuilderResult<Self> {
        let regex = Regex::new(&format!(r"^(?:{pattern})\z"))
            .map_err(|e| FormBuilderError::InvalidValue(format!("Invalid pattern: {e}")))?;
        Ok(Self { regex })
    }
}

impl Validator for PatternValidator {
    fn is_valid(&self, value: &Value) -> bool {
        self.regex.is_match(&text_of(value))
    }

    fn code(&self) -> &'static str {
        "pattern"
    }

    fn name(&self) -> &str {
        "PatternValidator"
    }
}

/// Validates an e-mail address.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl Validator for EmailValidator {
    fn is_valid(&self, value: &Value) -> bool {
        static EMAIL: OnceLock<Regex> = OnceLock::new();
        let re = EMAIL.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
        });
        re.is_match(&text_of(value))
    }

    fn code(&self) -> &'static str {
        "email"
    }

    fn name(&self) -> &str {
        "EmailValidator"
    }
}

/// Validates a URL. A value that becomes a valid URL with `http://` prepended is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlValidator;

impl UrlValidator {
    fn is_url(candidate: &str) -> bool {
        if candidate.chars().any(char::is_whitespace) {
            return false;
        }
        url::Url::parse(candidate).is_ok_and(|u| {
            matches!(u.scheme(), "http" | "https" | "ftp")
                && u.host_str()
                    .is_some_and(|h| h == "localhost" || h.contains('.'))
        })
    }
}

impl Validator for UrlValidator {
    fn is_valid(&self, value: &Value) -> bool {
        let text = text_of(value);
        Self::is_url(&text) || Self::is_url(&format!("http://{text}"))
    }

    fn code(&self) -> &'static str {
        "url"
    }

    fn name(&self) -> &str {
        "UrlValidator"
    }
}

/// Validates an integer (or an integer-looking string).
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerValidator;

impl Validator for IntegerValidator {
    fn is_valid(&self, value: &Value) -> bool {
        static INTEGER: OnceLock<Regex> = OnceLock::new();
        match value {
            Value::Int(_) => true,
            Value::Float(f) => f.fract() == 0.0,
            Value::String(s) => INTEGER
                .get_or_init(|| Regex::new(r"^-?[0-9]+\z").expect("valid regex"))
                .is_match(s.trim()),
            _ => false,
        }
    }

    fn code(&self) -> &'static str {
        "integer"
    }

    fn name(&self) -> &str {
        "IntegerValidator"
    }
}

/// Validates a number (or a number-looking string, with `.` or `,` as decimal mark).
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatValidator;

impl Validator for FloatValidator {
    fn is_valid(&self, value: &Value) -> bool {
        static NUMERIC: OnceLock<Regex> = OnceLock::new();
        match value {
            Value::Int(_) | Value::Float(_) => true,
            Value::String(s) => NUMERIC
                .get_or_init(|| Regex::new(r"^-?[0-9]*[.]?[0-9]+\z").expect("valid regex"))
                .is_match(&s.trim().replace(',', ".")),
            _ => false,
        }
    }

    fn code(&self) -> &'static str {
        "float"
    }

    fn name(&self) -> &str {
        "FloatValidator"
    }
}
