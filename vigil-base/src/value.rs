//! The dynamic [`Value`] container.
//!
//! Fields are boxed into a `Value` when read through the reflective field
//! protocol and unboxed with [`FromValue`] when written. Unboxing is strict:
//! the only implicit conversion is integer to floating point.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::object::Object;
use crate::ownership::{ObjectHandle, downcast_object};

/// A dynamically typed value.
///
/// An object value holds an owning handle and keeps the object alive.
/// Object values compare by identity.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Empty,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(ObjectHandle),
}

/// The dynamic type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Empty,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// Unboxing failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value has the wrong dynamic type.
    #[error("expected {expected}, got {actual}")]
    Kind { expected: ValueKind, actual: ValueKind },

    /// The value holds an object of the wrong class.
    #[error("expected object of type {expected}, got {actual}")]
    ObjectType { expected: String, actual: String },

    /// An integer does not fit the target type.
    #[error("integer {value} out of range for {target}")]
    OutOfRange { value: i64, target: &'static str },
}

impl Value {
    /// Returns the dynamic type.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Empty => ValueKind::Empty,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float; integers are widened.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Unboxes into `T`.
    pub fn get<T: FromValue>(self) -> Result<T, ValueError> {
        T::from_value(self)
    }

    fn mismatch(&self, expected: ValueKind) -> ValueError {
        ValueError::Kind {
            expected,
            actual: self.kind(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Self::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Self::Object(object) => f.debug_tuple("Object").field(object).finish(),
        }
    }
}

// ── Boxing ───────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

impl From<ObjectHandle> for Value {
    fn from(object: ObjectHandle) -> Self {
        Self::Object(object)
    }
}

impl<T: Object> From<Arc<T>> for Value {
    fn from(object: Arc<T>) -> Self {
        Self::Object(object)
    }
}

// ── Unboxing ─────────────────────────────────────────────────────

/// Checked conversion out of a [`Value`].
pub trait FromValue: Sized {
    /// The dynamic type this conversion accepts.
    const KIND: ValueKind;

    fn from_value(value: Value) -> Result<Self, ValueError>;
}

impl FromValue for Value {
    const KIND: ValueKind = ValueKind::Empty;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl FromValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value.as_bool().ok_or_else(|| value.mismatch(Self::KIND))
    }
}

impl FromValue for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value.as_i64().ok_or_else(|| value.mismatch(Self::KIND))
    }
}

impl FromValue for i32 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let wide = i64::from_value(value)?;
        Self::try_from(wide).map_err(|_| ValueError::OutOfRange {
            value: wide,
            target: "i32",
        })
    }
}

impl FromValue for u32 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let wide = i64::from_value(value)?;
        Self::try_from(wide).map_err(|_| ValueError::OutOfRange {
            value: wide,
            target: "u32",
        })
    }
}

impl FromValue for f64 {
    const KIND: ValueKind = ValueKind::Number;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value.as_f64().ok_or_else(|| value.mismatch(Self::KIND))
    }
}

impl FromValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const KIND: ValueKind = ValueKind::Array;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Empty => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for ObjectHandle {
    const KIND: ValueKind = ValueKind::Object;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Object(object) => Ok(object),
            other => Err(other.mismatch(Self::KIND)),
        }
    }
}

impl<T: Object> FromValue for Arc<T> {
    const KIND: ValueKind = ValueKind::Object;

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let object = ObjectHandle::from_value(value)?;
        downcast_object::<T>(object).map_err(|object| ValueError::ObjectType {
            expected: std::any::type_name::<T>().to_string(),
            actual: object.reflection_type().name().to_string(),
        })
    }
}
