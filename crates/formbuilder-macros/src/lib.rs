//! # formbuilder-macros
//!
//! Procedural macros for the formbuilder workspace.
//!
//! `#[derive(Entity)]` reads per-field annotation attributes, in declaration
//! order, and generates `formbuilder_meta::entity::Entity` and
//! `formbuilder_meta::entity::EntityClass` implementations backed by a lazily
//! built, static `EntityDescriptor`.
//!
//! ## Field attributes
//!
//! | Attribute | Annotation |
//! |---|---|
//! | `#[column(type = "string")]` | persisted column with a storage type |
//! | `#[id]` | entity identifier |
//! | `#[generated_value]` | storage-generated identifier |
//! | `#[one_to_one(target_entity = "Car")]` | single-valued relation |
//! | `#[form_ignore]` | never gets a control |
//! | `#[password]` | renders as a password input |
//! | `#[constraint(min_length(value = 3, message = "..."))]` | validation constraint |
//!
//! The deriving struct must implement `Default` and `Debug`. Column and identifier
//! fields must be `Clone`, convertible into `Value`, and implement `FromValue`.
//!
//! This crate is independent of all other formbuilder crates because
//! proc-macro crates cannot depend on crates that use them.

mod constraint;
mod entity;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `Entity` and `EntityClass` for a struct with named fields.
#[proc_macro_derive(
    Entity,
    attributes(column, id, generated_value, one_to_one, form_ignore, password, constraint)
)]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::derive_entity_impl(input).into()
}
