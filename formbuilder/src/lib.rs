//! # formbuilder
//!
//! Entity-driven forms for Rust.
//!
//! This is the meta-crate that re-exports the workspace crates. Depend on
//! `formbuilder` to get everything, or on the individual crates for finer
//! control.
//!
//! ```ignore
//! use formbuilder::prelude::*;
//!
//! #[derive(Debug, Default, Entity)]
//! pub struct User {
//!     #[column(type = "string")]
//!     #[constraint(not_blank(message = "user.nameNotFilled"))]
//!     pub name: String,
//! }
//!
//! let mut builder = FormBuilder::new("registration", Settings::bare());
//! builder.set_entity(User::default())?;
//! let html = builder.render()?;
//! ```

/// Errors, settings, translation, signing and logging.
pub use formbuilder_core as core;

/// Values, annotations, constraints, validators and the entity traits.
pub use formbuilder_meta as meta;

/// `#[derive(Entity)]`.
#[cfg(feature = "macros")]
pub use formbuilder_macros as macros;

/// The form builder and the form layer it drives.
pub use formbuilder_forms as forms;

// Third-party re-exports for user convenience
pub use chrono;
pub use http;
pub use tracing;

/// The names most applications need.
pub mod prelude {
    pub use formbuilder_core::{
        CatalogTranslator, FormBuilderError, FormBuilderResult, Settings, Translator,
    };
    pub use formbuilder_forms::{
        transform, BuilderOptions, Control, Form, FormBuilder, FormBuilderFactory, SubmittedData,
    };
    #[cfg(feature = "macros")]
    pub use formbuilder_macros::Entity;
    pub use formbuilder_meta::{Entity, EntityClass, Value};
}
