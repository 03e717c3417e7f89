//! Core identifier types for the Vigil object runtime.
//!
//! This crate defines the small, dependency-light types that every other
//! Vigil crate agrees on:
//! - Object identifiers (UUID v7), which also define the canonical lock order
//! - Field identifiers used by the reflective field protocol
//!
//! Domain classes (hosts, services, ...) live in their own crates, not here.

mod ids;

pub use ids::{FieldId, ObjectId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
