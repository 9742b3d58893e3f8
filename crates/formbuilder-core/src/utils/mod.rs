//! Utility functions.
//!
//! - [`text`]: String helpers used for naming and rendering.

pub mod text;
