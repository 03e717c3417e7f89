//! Field metadata and errors of the reflective field protocol.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vigil_types::FieldId;

use crate::types::Type;
use crate::value::{FromValue, Value, ValueError, ValueKind};

/// Result type for field access.
pub type FieldResult<T> = Result<T, FieldError>;

/// Field access failed. The object is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The class has no field with this id.
    #[error("{type_name} has no field with id {id}")]
    NotFound { type_name: String, id: FieldId },

    /// The value could not be unboxed to the field's type.
    #[error("field {id} of {type_name}: {source}")]
    TypeMismatch {
        type_name: String,
        id: FieldId,
        #[source]
        source: ValueError,
    },

    /// The value has the right type but is not acceptable.
    #[error("invalid value for field {id} of {type_name}: {reason}")]
    Invalid {
        type_name: String,
        id: FieldId,
        reason: String,
    },
}

impl FieldError {
    pub fn not_found(ty: &Type, id: FieldId) -> Self {
        Self::NotFound {
            type_name: ty.name().to_string(),
            id,
        }
    }

    pub fn invalid(ty: &Type, id: FieldId, reason: impl Into<String>) -> Self {
        Self::Invalid {
            type_name: ty.name().to_string(),
            id,
            reason: reason.into(),
        }
    }

    /// Returns the id of the field the error is about.
    #[must_use]
    pub const fn field_id(&self) -> FieldId {
        match self {
            Self::NotFound { id, .. } | Self::TypeMismatch { id, .. } | Self::Invalid { id, .. } => {
                *id
            }
        }
    }
}

/// Describes one field of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub id: FieldId,
    pub name: String,
    pub kind: ValueKind,
}

impl FieldInfo {
    pub fn new(id: FieldId, name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }
}

/// Unboxes a value written to field `id` of `ty`.
///
/// Used by `set_field` implementations before touching any state.
pub fn unbox_field<T: FromValue>(ty: &Type, id: FieldId, value: Value) -> FieldResult<T> {
    T::from_value(value).map_err(|source| FieldError::TypeMismatch {
        type_name: ty.name().to_string(),
        id,
        source,
    })
}
