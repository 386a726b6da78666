//! Pass-through output values
//!
//! Backend JSON is never mapped onto Rust structs. Object-typed fields carry
//! the raw `serde_json::Value` as their parent value and child fields pick
//! their member out of it; scalars convert directly.

use std::collections::HashSet;

use async_graphql::dynamic::{FieldValue, TypeRef};
use async_graphql::parser::types::{BaseType, Type};
use async_graphql::Value;

/// Names of the object types in the composed schema
pub type ObjectTypes = HashSet<String>;

/// Convert a parsed SDL type into a dynamic schema type reference
pub fn type_ref(ty: &Type) -> TypeRef {
    let base = match &ty.base {
        BaseType::Named(name) => TypeRef::Named(name.to_string().into()),
        BaseType::List(inner) => TypeRef::List(Box::new(type_ref(inner))),
    };
    if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}

/// Shape a backend JSON value for a field of type `ty`.
///
/// `null` resolves to no value and lets the executor enforce nullability.
pub fn shape<'a>(
    value: serde_json::Value,
    ty: &Type,
    objects: &ObjectTypes,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    if value.is_null() {
        return Ok(None);
    }

    match &ty.base {
        BaseType::List(inner) => {
            let serde_json::Value::Array(items) = value else {
                return Err(async_graphql::Error::new(format!(
                    "Expected a list for `{}`, backend returned {}",
                    ty, value
                )));
            };
            let items = items
                .into_iter()
                .map(|item| Ok(shape(item, inner, objects)?.unwrap_or(FieldValue::NULL)))
                .collect::<async_graphql::Result<Vec<_>>>()?;
            Ok(Some(FieldValue::list(items)))
        }
        BaseType::Named(name) if objects.contains(name.as_str()) => {
            Ok(Some(FieldValue::owned_any(value)))
        }
        BaseType::Named(_) => Ok(Some(FieldValue::value(Value::from_json(value)?))),
    }
}

/// Member `field` of a pass-through parent object
pub fn member(parent: &serde_json::Value, field: &str) -> serde_json::Value {
    parent.get(field).cloned().unwrap_or(serde_json::Value::Null)
}
