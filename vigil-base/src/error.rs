//! Error types for the object runtime.

use thiserror::Error;
use vigil_types::ObjectId;

use crate::field::FieldError;

/// Result type for registry, construction and serialization operations.
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Errors surfaced to callers of the runtime.
///
/// Contract violations (a wrong self-reference cast, re-locking an object on
/// the thread that holds it) are not represented here: they panic.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// No type is registered under this name.
    #[error("unknown type: {0}")]
    TypeNotFound(String),

    /// A different descriptor already uses this name.
    #[error("type already registered: {0}")]
    DuplicateType(String),

    /// The type has no factory.
    #[error("type cannot be instantiated: {0}")]
    NotInstantiable(String),

    /// An object was not of the requested type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A factory failed to construct its object.
    #[error("failed to construct {type_name}: {reason}")]
    Construction { type_name: String, reason: String },

    /// Reflective field access failed.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Serialization reached an object that is already being serialized.
    #[error("reference cycle through object {0}")]
    Cycle(ObjectId),

    /// A value has no JSON representation.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A JSON object declaration is malformed.
    #[error("invalid object declaration: {0}")]
    InvalidDeclaration(String),
}
