//! # formbuilder-meta
//!
//! The metadata source for the form builder: attribute [`Value`]s, the closed
//! set of property [`Annotation`]s, validation constraint declarations and
//! their validators, and the [`Entity`] / [`EntityClass`] traits with their
//! static [`EntityDescriptor`]s.
//!
//! ## Modules
//!
//! - [`value`] - Attribute values and lenient conversion back to Rust types
//! - [`annotations`] - Column, identifier, relation, ignore, password and constraint annotations
//! - [`constraints`] - Constraint declarations, rule kinds and parameters
//! - [`validators`] - One validator per rule kind
//! - [`entity`] - Entity descriptors and the runtime entity interface

pub mod annotations;
pub mod constraints;
pub mod entity;
pub mod validators;
pub mod value;

pub use annotations::{Annotation, ColumnType};
pub use constraints::{Constraint, ConstraintKind, RuleKind, RuleParams};
pub use entity::{Entity, EntityClass, EntityDescriptor, PropertyDescriptor};
pub use validators::Validator;
pub use value::{FromValue, Value};

// Re-exported for code generated by `#[derive(Entity)]`.
pub use formbuilder_core::{FormBuilderError, FormBuilderResult};
