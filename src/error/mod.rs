//! Error handling built on `thiserror` and `anyhow`.
//!
//! Domain-specific error types for precise handling, plus operational
//! context propagation and user-facing reporting.

pub mod domain;
pub mod operational;

pub use {
    domain::{AuthError, CatalogError, FieldErrors, FormError},
    operational::{ErrorReporter, ResultExt},
};
