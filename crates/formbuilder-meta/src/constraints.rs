//! Validation constraint declarations.
//!
//! A [`Constraint`] is an inert record attached to an entity property: a
//! [`ConstraintKind`], its [`RuleParams`], and a message template. The form
//! layer turns each constraint into a [`RuleKind`] plus the same parameters
//! and message; the matching check lives in [`crate::validators`].

use std::fmt;

use formbuilder_core::Params;

use crate::value::Value;

/// The declared kind of a validation constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// The value must not be blank.
    NotBlank,
    /// Alias of `NotBlank` kept for declaration compatibility.
    Filled,
    /// The value must have exactly `value` characters.
    Length,
    /// The value length must be within `min..=max`.
    LengthRange,
    /// The value must have at least `value` characters.
    MinLength,
    /// The value must have at most `value` characters.
    MaxLength,
    /// The number must be within `min..=max`.
    Range,
    /// The number must be at least `value`.
    Min,
    /// The number must be at most `value`.
    Max,
    /// The whole value must match the regular expression `value`.
    Pattern,
    /// The value must be an e-mail address.
    Email,
    /// The value must be a URL.
    Url,
    /// The value must be an integer.
    Integer,
    /// The value must be a number.
    Float,
}

impl ConstraintKind {
    /// The message used when a declaration does not provide one.
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::NotBlank | Self::Filled => "The value must be filled.",
            Self::Length => "The value does not have the required length.",
            Self::LengthRange => "The value is not within required length range.",
            Self::MinLength => "The value is too short.",
            Self::MaxLength => "The value is too long.",
            Self::Range => "The number is not withing required range.",
            Self::Min => "The number is too low.",
            Self::Max => "The number is too high.",
            Self::Pattern => "The value does not match required pattern.",
            Self::Email => "The value is not a valid e-mail address.",
            Self::Url => "The value is not a valid URL.",
            Self::Integer => "The value %value% is not a valid integer.",
            Self::Float => "The value %value% is not a valid float number.",
        }
    }

    /// The form rule this constraint turns into.
    pub const fn rule_kind(self) -> RuleKind {
        match self {
            Self::NotBlank | Self::Filled => RuleKind::Required,
            Self::Length | Self::LengthRange => RuleKind::Length,
            Self::MinLength => RuleKind::MinLength,
            Self::MaxLength => RuleKind::MaxLength,
            Self::Range => RuleKind::Range,
            Self::Min => RuleKind::Min,
            Self::Max => RuleKind::Max,
            Self::Pattern => RuleKind::Pattern,
            Self::Email => RuleKind::Email,
            Self::Url => RuleKind::Url,
            Self::Integer => RuleKind::Integer,
            Self::Float => RuleKind::Float,
        }
    }
}

/// The kind of a validation rule attached to a form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// The control must be filled.
    Required,
    /// Minimum length in characters.
    MinLength,
    /// Maximum length in characters.
    MaxLength,
    /// Exact length, or a length range when given `min`/`max`.
    Length,
    /// Numeric range with optional open ends.
    Range,
    /// Numeric lower bound.
    Min,
    /// Numeric upper bound.
    Max,
    /// Full-value regular expression match.
    Pattern,
    /// E-mail address.
    Email,
    /// URL.
    Url,
    /// Integer number.
    Integer,
    /// Any number.
    Float,
}

impl RuleKind {
    /// A short lowercase code used in validation errors and markup.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Required => "filled",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::Length => "length",
            Self::Range => "range",
            Self::Min => "min",
            Self::Max => "max",
            Self::Pattern => "pattern",
            Self::Email => "email",
            Self::Url => "url",
            Self::Integer => "integer",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Kind-specific rule parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RuleParams {
    /// The rule takes no parameters.
    #[default]
    None,
    /// A single parameter (length, bound, or pattern).
    Value(Value),
    /// A range; either end may be open.
    Range {
        /// Inclusive lower bound.
        min: Option<Value>,
        /// Inclusive upper bound.
        max: Option<Value>,
    },
}

impl RuleParams {
    /// Returns the placeholders these parameters expose to message templates.
    ///
    /// A single value is `%value%`; a range is `%min%` and `%max%`.
    pub fn placeholders(&self) -> Params {
        let mut params = Params::new();
        match self {
            Self::None => {}
            Self::Value(v) => params.insert("value", v),
            Self::Range { min, max } => {
                if let Some(min) = min {
                    params.insert("min", min);
                }
                if let Some(max) = max {
                    params.insert("max", max);
                }
            }
        }
        params
    }

    /// Returns the single parameter, if any.
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// A validation constraint declared on an entity property.
///
/// # Examples
///
/// ```
/// use formbuilder_meta::constraints::{Constraint, ConstraintKind};
///
/// let c = Constraint::min_length(3).with_message("user.nameTooShort");
/// assert_eq!(c.kind, ConstraintKind::MinLength);
/// assert_eq!(c.message, "user.nameTooShort");
///
/// let c = Constraint::not_blank();
/// assert_eq!(c.message, "The value must be filled.");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// The constraint kind.
    pub kind: ConstraintKind,
    /// Kind-specific parameters.
    pub params: RuleParams,
    /// The message template (a translation key or a sentence).
    pub message: String,
}

impl Constraint {
    /// Creates a constraint with the kind's default message.
    pub fn new(kind: ConstraintKind, params: RuleParams) -> Self {
        Self {
            kind,
            params,
            message: kind.default_message().to_string(),
        }
    }

    /// Replaces the message template.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// `NotBlank`: the value must be filled.
    pub fn not_blank() -> Self {
        Self::new(ConstraintKind::NotBlank, RuleParams::None)
    }

    /// `Filled`: the value must be filled.
    pub fn filled() -> Self {
        Self::new(ConstraintKind::Filled, RuleParams::None)
    }

    /// Exact length in characters.
    pub fn length(value: usize) -> Self {
        Self::new(ConstraintKind::Length, RuleParams::Value(length_value(value)))
    }

    /// Length range in characters; either end may be open.
    pub fn length_range(min: Option<usize>, max: Option<usize>) -> Self {
        Self::new(
            ConstraintKind::LengthRange,
            RuleParams::Range {
                min: min.map(length_value),
                max: max.map(length_value),
            },
        )
    }

    /// Minimum length in characters.
    pub fn min_length(value: usize) -> Self {
        Self::new(ConstraintKind::MinLength, RuleParams::Value(length_value(value)))
    }

    /// Maximum length in characters.
    pub fn max_length(value: usize) -> Self {
        Self::new(ConstraintKind::MaxLength, RuleParams::Value(length_value(value)))
    }

    /// Numeric range; either end may be open.
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(
            ConstraintKind::Range,
            RuleParams::Range {
                min: min.map(number_value),
                max: max.map(number_value),
            },
        )
    }

    /// Numeric lower bound.
    pub fn min(value: f64) -> Self {
        Self::new(ConstraintKind::Min, RuleParams::Value(number_value(value)))
    }

    /// Numeric upper bound.
    pub fn max(value: f64) -> Self {
        Self::new(ConstraintKind::Max, RuleParams::Value(number_value(value)))
    }

    /// Regular expression the whole value must match.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::new(
            ConstraintKind::Pattern,
            RuleParams::Value(Value::String(pattern.into())),
        )
    }

    /// E-mail address.
    pub fn email() -> Self {
        Self::new(ConstraintKind::Email, RuleParams::None)
    }

    /// URL.
    pub fn url() -> Self {
        Self::new(ConstraintKind::Url, RuleParams::None)
    }

    /// Integer number.
    pub fn integer() -> Self {
        Self::new(ConstraintKind::Integer, RuleParams::None)
    }

    /// Any number.
    pub fn float() -> Self {
        Self::new(ConstraintKind::Float, RuleParams::None)
    }
}

fn length_value(value: usize) -> Value {
    Value::Int(i64::try_from(value).unwrap_or(i64::MAX))
}

/// Whole numbers are kept as integers so that `%value%` renders as `3`, not `3.0`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::Int(value as i64)
    } else {
        Value::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_messages() {
        assert_eq!(Constraint::filled().message, "The value must be filled.");
        assert_eq!(Constraint::min_length(1).message, "The value is too short.");
        assert_eq!(Constraint::max_length(1).message, "The value is too long.");
        assert_eq!(
            Constraint::range(Some(1.0), Some(2.0)).message,
            "The number is not withing required range."
        );
        assert_eq!(
            Constraint::integer().message,
            "The value %value% is not a valid integer."
        );
    }

    #[test]
    fn test_rule_kind_mapping() {
        assert_eq!(ConstraintKind::NotBlank.rule_kind(), RuleKind::Required);
        assert_eq!(ConstraintKind::Filled.rule_kind(), RuleKind::Required);
        assert_eq!(ConstraintKind::LengthRange.rule_kind(), RuleKind::Length);
        assert_eq!(ConstraintKind::Length.rule_kind(), RuleKind::Length);
        assert_eq!(ConstraintKind::Max.rule_kind(), RuleKind::Max);
    }

    #[test]
    fn test_params() {
        assert_eq!(
            Constraint::min_length(3).params,
            RuleParams::Value(Value::Int(3))
        );
        assert_eq!(
            Constraint::length_range(Some(2), None).params,
            RuleParams::Range {
                min: Some(Value::Int(2)),
                max: None
            }
        );
        assert_eq!(Constraint::min(1.5).params, RuleParams::Value(Value::Float(1.5)));
        assert_eq!(Constraint::max(10.0).params, RuleParams::Value(Value::Int(10)));
    }

    #[test]
    fn test_placeholders() {
        let p = Constraint::min_length(3).params.placeholders();
        assert_eq!(p.get("value"), Some("3"));

        let p = Constraint::range(Some(1.0), None).params.placeholders();
        assert_eq!(p.get("min"), Some("1"));
        assert_eq!(p.get("max"), None);

        assert!(Constraint::email().params.placeholders().is_empty());
    }

    #[test]
    fn test_rule_kind_display() {
        assert_eq!(RuleKind::MinLength.to_string(), "min_length");
        assert_eq!(RuleKind::Required.code(), "filled");
    }
}
