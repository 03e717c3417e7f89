//! JSON representation of objects, built on the reflective field protocol.
//!
//! An object is written as
//! `{"type": "<name>", "id": "<uuid>", "fields": {"<field>": <value>, ...}}`.
//! Nested objects are written inline. The `id` is informational: objects read
//! back get fresh ids.

use std::collections::HashSet;

use serde_json::{Map, Number, Value as JsonValue, json};
use vigil_types::ObjectId;

use crate::error::{ObjectError, ObjectResult};
use crate::object::Object;
use crate::ownership::ObjectHandle;
use crate::registry::TypeRegistry;
use crate::value::Value;

/// Serializes an object and everything it references.
///
/// Fails with [`ObjectError::Cycle`] if the object graph contains a cycle.
/// Each object is locked only while one of its fields is read.
pub fn to_json(object: &dyn Object) -> ObjectResult<JsonValue> {
    let mut visiting = HashSet::new();
    object_to_json(object, &mut visiting)
}

/// Serializes a value.
pub fn value_to_json(value: &Value) -> ObjectResult<JsonValue> {
    value_to_json_inner(value, &mut HashSet::new())
}

/// Constructs an object from its JSON declaration.
///
/// Types are resolved through `registry`; fields are written by name through
/// `set_field`. Unknown fields are errors.
pub fn from_json(registry: &TypeRegistry, declaration: &JsonValue) -> ObjectResult<ObjectHandle> {
    let decl = declaration
        .as_object()
        .ok_or_else(|| ObjectError::InvalidDeclaration("expected a JSON object".into()))?;
    let type_name = decl
        .get("type")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| ObjectError::InvalidDeclaration("missing \"type\"".into()))?;

    let ty = registry.get(type_name)?;
    let object = ty.instantiate()?;

    if let Some(fields) = decl.get("fields") {
        let fields = fields.as_object().ok_or_else(|| {
            ObjectError::InvalidDeclaration(format!("{type_name}: \"fields\" must be an object"))
        })?;
        for (name, raw) in fields {
            let info = ty.field_by_name(name).ok_or_else(|| {
                ObjectError::InvalidDeclaration(format!("{type_name} has no field named {name}"))
            })?;
            let value = json_to_value(registry, raw)?;
            object.set_field(info.id, value)?;
        }
    }

    Ok(object)
}

fn object_to_json(object: &dyn Object, visiting: &mut HashSet<ObjectId>) -> ObjectResult<JsonValue> {
    let id = object.object_id();
    if !visiting.insert(id) {
        return Err(ObjectError::Cycle(id));
    }

    let ty = object.reflection_type();
    let mut fields = Map::new();
    for field in ty.fields() {
        let value = object.get_field(field.id)?;
        fields.insert(field.name.clone(), value_to_json_inner(&value, visiting)?);
    }

    visiting.remove(&id);
    Ok(json!({
        "type": ty.name(),
        "id": id,
        "fields": fields,
    }))
}

fn value_to_json_inner(value: &Value, visiting: &mut HashSet<ObjectId>) -> ObjectResult<JsonValue> {
    Ok(match value {
        Value::Empty => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Integer(i) => JsonValue::Number((*i).into()),
        Value::Number(n) => Number::from_f64(*n)
            .map(JsonValue::Number)
            .ok_or_else(|| ObjectError::InvalidValue(format!("{n} has no JSON representation")))?,
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Array(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| value_to_json_inner(item, visiting))
                .collect::<ObjectResult<_>>()?,
        ),
        Value::Object(object) => object_to_json(object.as_ref(), visiting)?,
    })
}

fn json_to_value(registry: &TypeRegistry, raw: &JsonValue) -> ObjectResult<Value> {
    Ok(match raw {
        JsonValue::Null => Value::Empty,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| ObjectError::InvalidValue(format!("unsupported number {n}")))?,
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| json_to_value(registry, item))
                .collect::<ObjectResult<_>>()?,
        ),
        JsonValue::Object(_) => Value::Object(from_json(registry, raw)?),
    })
}
