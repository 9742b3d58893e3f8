//! # formbuilder-forms
//!
//! Forms built from entity metadata. The [`FormBuilder`] derives controls,
//! labels, default values and validation rules from the annotations of a
//! main entity and its related entities, and writes submitted values back
//! onto them. The form layer it drives ([`Form`], [`Control`], widgets and
//! CSRF protection) lives here too.
//!
//! ## Modules
//!
//! - [`builder`] - The form builder facade and its lifecycle
//! - [`factory`] - Builders sharing settings and a translator
//! - [`metadata`] - Property metadata derived from annotations
//! - [`registry`] - The main entity and its related entities
//! - [`planner`] - Control naming, control construction and write-back
//! - [`form`] - Forms, submission and rendering
//! - [`control`] - Form controls and their requirement
//! - [`rules`] - Validation rules attached to controls
//! - [`widgets`] - HTML widgets per input kind
//! - [`csrf`] - Signed protection tokens
//! - [`submission`] - Submitted urlencoded data

pub mod builder;
pub mod control;
pub mod csrf;
pub mod factory;
pub mod form;
pub mod metadata;
pub mod planner;
pub mod registry;
pub mod rules;
pub mod submission;
pub mod widgets;

#[cfg(test)]
mod test_models;

pub use builder::{BuilderState, FormBuilder};
pub use control::{Control, Requirement};
pub use factory::{BuilderOptions, FormBuilderFactory};
pub use form::Form;
pub use planner::{transform, ControlPath, Transform};
pub use registry::{EntityEntry, EntityHandle};
pub use submission::SubmittedData;
pub use widgets::InputKind;
