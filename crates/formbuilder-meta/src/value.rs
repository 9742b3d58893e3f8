//! Attribute values exchanged between entities and form controls.
//!
//! The [`Value`] enum is the currency of the whole workspace: entities expose
//! their attributes as `Value`s, controls hold submitted input as `Value`s,
//! and validators and transforms operate on them. [`FromValue`] converts a
//! `Value` back into a concrete attribute type, leniently accepting the
//! string forms a browser submits.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use formbuilder_core::{FormBuilderError, FormBuilderResult};

/// A dynamically typed attribute value.
///
/// # Examples
///
/// ```
/// use formbuilder_meta::value::Value;
///
/// let v = Value::from(42_i64);
/// assert_eq!(v, Value::Int(42));
///
/// let v = Value::from("hello");
/// assert_eq!(v, Value::String("hello".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// No value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// A date without time.
    Date(NaiveDate),
    /// A date and time without timezone.
    DateTime(NaiveDateTime),
    /// A time without date.
    Time(NaiveTime),
    /// A list of values (multi-valued controls).
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::List(vals) => {
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::String(v.clone())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Clone + Into<Value>> From<&Option<T>> for Value {
    fn from(v: &Option<T>) -> Self {
        v.clone().map_or(Self::Null, Into::into)
    }
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if this value counts as filled in by the user.
    ///
    /// `Null`, the empty string, an empty list and an unchecked checkbox
    /// (`false`) are not filled.
    pub fn is_filled(&self) -> bool {
        match self {
            Self::Null | Self::Bool(false) => false,
            Self::String(s) => !s.is_empty(),
            Self::List(l) => !l.is_empty(),
            _ => true,
        }
    }

    /// Attempts to extract a boolean value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract a float value.
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets this value as a number, parsing numeric strings.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Returns the string a form control would carry for this value.
    ///
    /// Booleans become `"1"` / `""`, `Null` becomes `""`.
    pub fn to_form_string(&self) -> String {
        match self {
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) | Self::Null => String::new(),
            other => other.to_string(),
        }
    }
}

// ── FromValue ──────────────────────────────────────────────────────────

/// Converts a [`Value`] into a concrete attribute type.
///
/// Conversions are lenient about strings, since submitted form data is
/// always textual: numeric strings parse into numbers, `"1"`/`"on"` into
/// `true`, ISO and `d.m.Y` strings into dates, and an empty string into
/// `None` for optional attributes.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> FormBuilderResult<Self>;
}

fn mismatch(expected: &str, value: &Value) -> FormBuilderError {
    FormBuilderError::InvalidValue(format!("Expected {expected}, got {value:?}"))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Null => Ok(Self::new()),
            Value::List(_) => Err(mismatch("String", value)),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(Self::from(*b)),
            Value::String(s) => s.trim().parse().map_err(|_| mismatch("Int", value)),
            _ => Err(mismatch("Int", value)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        let wide = i64::from_value(value)?;
        Self::try_from(wide).map_err(|e| {
            FormBuilderError::InvalidValue(format!("Int value out of i32 range: {e}"))
        })
    }
}

impl FromValue for u32 {
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        let wide = i64::from_value(value)?;
        Self::try_from(wide).map_err(|e| {
            FormBuilderError::InvalidValue(format!("Int value out of u32 range: {e}"))
        })
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        match value {
            Value::Int(_) | Value::Float(_) | Value::String(_) => {
                value.to_number().ok_or_else(|| mismatch("Float", value))
            }
            _ => Err(mismatch("Float", value)),
        }
    }
}

impl FromValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        f64::from_value(value).map(|f| f as Self)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Null => Ok(false),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "1" | "on" | "true" | "yes" => Ok(true),
                "" | "0" | "off" | "false" | "no" => Ok(false),
                _ => Err(mismatch("Bool", value)),
            },
            _ => Err(mismatch("Bool", value)),
        }
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d. %m. %Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::DateTime(dt) => Ok(dt.date()),
            Value::String(s) => DATE_FORMATS
                .iter()
                .find_map(|fmt| Self::parse_from_str(s.trim(), fmt).ok())
                .ok_or_else(|| mismatch("Date", value)),
            _ => Err(mismatch("Date", value)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            Value::String(s) => DATETIME_FORMATS
                .iter()
                .find_map(|fmt| Self::parse_from_str(s.trim(), fmt).ok())
                .ok_or_else(|| mismatch("DateTime", value)),
            _ => Err(mismatch("DateTime", value)),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        match value {
            Value::Time(t) => Ok(*t),
            Value::DateTime(dt) => Ok(dt.time()),
            Value::String(s) => TIME_FORMATS
                .iter()
                .find_map(|fmt| Self::parse_from_str(s.trim(), fmt).ok())
                .ok_or_else(|| mismatch("Time", value)),
            _ => Err(mismatch("Time", value)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> FormBuilderResult<Self> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_integers() {
        assert_eq!(Value::from(42_i32), Value::Int(42));
        assert_eq!(Value::from(42_i64), Value::Int(42));
        assert_eq!(Value::from(42_u32), Value::Int(42));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(42_i64)), Value::Int(42));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        let owned: Option<String> = Some("x".into());
        assert_eq!(Value::from(&owned), Value::String("x".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::String("hi".into()).to_string(), "hi");
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(list.to_string(), "1, 2");
    }

    #[test]
    fn test_is_filled() {
        assert!(!Value::Null.is_filled());
        assert!(!Value::String(String::new()).is_filled());
        assert!(!Value::Bool(false).is_filled());
        assert!(!Value::List(vec![]).is_filled());
        assert!(Value::String("a".into()).is_filled());
        assert!(Value::Int(0).is_filled());
        assert!(Value::Bool(true).is_filled());
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::Int(3).to_number(), Some(3.0));
        assert_eq!(Value::String(" 2.5 ".into()).to_number(), Some(2.5));
        assert_eq!(Value::String("2,5".into()).to_number(), Some(2.5));
        assert_eq!(Value::String("abc".into()).to_number(), None);
        assert_eq!(Value::Bool(true).to_number(), None);
    }

    #[test]
    fn test_to_form_string() {
        assert_eq!(Value::Bool(true).to_form_string(), "1");
        assert_eq!(Value::Bool(false).to_form_string(), "");
        assert_eq!(Value::Null.to_form_string(), "");
        assert_eq!(Value::Int(7).to_form_string(), "7");
    }

    // ── FromValue ───────────────────────────────────────────────────

    #[test]
    fn test_string_from_value() {
        assert_eq!(String::from_value(&Value::from("a")).unwrap(), "a");
        assert_eq!(String::from_value(&Value::Int(5)).unwrap(), "5");
        assert_eq!(String::from_value(&Value::Null).unwrap(), "");
    }

    #[test]
    fn test_int_from_string() {
        assert_eq!(i64::from_value(&Value::from("10")).unwrap(), 10);
        assert_eq!(i32::from_value(&Value::from(" -3 ")).unwrap(), -3);
        assert!(i64::from_value(&Value::from("ten")).is_err());
        assert!(i64::from_value(&Value::from("")).is_err());
    }

    #[test]
    fn test_int_out_of_range() {
        let err = i32::from_value(&Value::Int(i64::MAX)).unwrap_err();
        assert!(matches!(err, FormBuilderError::InvalidValue(_)));
        assert!(u32::from_value(&Value::Int(-1)).is_err());
    }

    #[test]
    fn test_float_from_value() {
        assert!((f64::from_value(&Value::from("1.5")).unwrap() - 1.5).abs() < f64::EPSILON);
        assert!((f64::from_value(&Value::Int(2)).unwrap() - 2.0).abs() < f64::EPSILON);
        assert!(f64::from_value(&Value::Bool(true)).is_err());
    }

    #[test]
    fn test_bool_from_value() {
        assert!(bool::from_value(&Value::from("on")).unwrap());
        assert!(bool::from_value(&Value::from("1")).unwrap());
        assert!(!bool::from_value(&Value::from("")).unwrap());
        assert!(!bool::from_value(&Value::Null).unwrap());
        assert!(bool::from_value(&Value::from("maybe")).is_err());
    }

    #[test]
    fn test_date_from_value() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(NaiveDate::from_value(&Value::from("2024-03-01")).unwrap(), d);
        assert_eq!(NaiveDate::from_value(&Value::from("01.03.2024")).unwrap(), d);
        assert!(NaiveDate::from_value(&Value::from("yesterday")).is_err());
    }

    #[test]
    fn test_datetime_from_value() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 5)
            .unwrap();
        assert_eq!(
            NaiveDateTime::from_value(&Value::from("01.03.2024 12:30:05")).unwrap(),
            dt
        );
        assert_eq!(
            NaiveDateTime::from_value(&Value::from("2024-03-01T12:30:05")).unwrap(),
            dt
        );
    }

    #[test]
    fn test_time_from_value() {
        let t = NaiveTime::from_hms_opt(8, 15, 0).unwrap();
        assert_eq!(NaiveTime::from_value(&Value::from("08:15")).unwrap(), t);
    }

    #[test]
    fn test_option_from_value() {
        assert_eq!(Option::<i64>::from_value(&Value::from("")).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(&Value::from("4")).unwrap(), Some(4));
        assert!(Option::<i64>::from_value(&Value::from("x")).is_err());
    }

    #[test]
    fn test_serde_layout() {
        let json = serde_json::to_value(Value::Int(3)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Int", "value": 3}));
    }
}
