//! # formbuilder-core
//!
//! Core types, settings, translation, and error types for the formbuilder workspace.
//! This crate has no dependency on the other formbuilder crates and provides the
//! foundation they build on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`i18n`] - The translator collaborator and a catalog-backed implementation
//! - [`settings`] - Builder settings with sensible defaults
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`signing`] - HMAC signing used for CSRF protection tokens
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - Small text helpers

pub mod error;
pub mod i18n;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod signing;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{FormBuilderError, FormBuilderResult, ValidationError};
pub use i18n::{CatalogTranslator, Params, Translator};
pub use settings::Settings;
