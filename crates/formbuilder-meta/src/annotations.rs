//! The closed set of property annotations the form builder understands.

use std::fmt;

use crate::constraints::Constraint;

/// The storage type declared by a persistence column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Short text.
    String,
    /// Long text.
    Text,
    /// Whole number.
    Integer,
    /// Floating-point number.
    Float,
    /// Boolean flag.
    Boolean,
    /// Date without time.
    Date,
    /// Date and time.
    DateTime,
    /// A storage type the form builder has no control for.
    Other(String),
}

impl ColumnType {
    /// Parses a declared storage type name. Unknown names become [`ColumnType::Other`].
    ///
    /// # Examples
    ///
    /// ```
    /// use formbuilder_meta::annotations::ColumnType;
    ///
    /// assert_eq!(ColumnType::parse("datetime"), ColumnType::DateTime);
    /// assert_eq!(ColumnType::parse("json"), ColumnType::Other("json".into()));
    /// ```
    pub fn parse(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "text" => Self::Text,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            other => Self::Other(other.to_string()),
        }
    }

    /// The declared name of this storage type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One annotation attached to an entity property.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// The property is a persisted column of the given storage type.
    Column {
        /// The declared storage type.
        column_type: ColumnType,
    },
    /// The property is the entity identifier.
    Id,
    /// The identifier is generated by storage. Carried for completeness.
    GeneratedValue,
    /// The property is a single-valued relation to `target_entity`.
    OneToOne {
        /// Simple name of the target entity type.
        target_entity: String,
    },
    /// The property never gets a control.
    Ignore,
    /// The property holds a secret and renders as a password input.
    Password,
    /// A validation constraint.
    Constraint(Constraint),
}

impl Annotation {
    /// Shorthand for `Annotation::Column { column_type: ColumnType::parse(name) }`.
    pub fn column(name: &str) -> Self {
        Self::Column {
            column_type: ColumnType::parse(name),
        }
    }

    /// Shorthand for a one-to-one relation annotation.
    pub fn one_to_one(target_entity: impl Into<String>) -> Self {
        Self::OneToOne {
            target_entity: target_entity.into(),
        }
    }
}

impl From<Constraint> for Annotation {
    fn from(c: Constraint) -> Self {
        Self::Constraint(c)
    }
}
