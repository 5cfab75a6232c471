// lib/src/util.rs
// JSON helpers shared by the storage engines and typed collections.

use serde_json::{Map, Value};

use crate::errors::{Result, StorageError};

/// Fields a client update may never rewrite.
pub const IMMUTABLE_FIELDS: &[&str] = &["id", "createdAt"];

/// Applies an RFC 7386 merge patch to `target`.
///
/// Object members are merged recursively, `null` removes a member, and any
/// non-object patch replaces the target outright.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

/// Validates that a client update is a JSON object and strips immutable
/// fields from it.
pub fn sanitize_patch(patch: Value) -> Result<Value> {
    match patch {
        Value::Object(mut map) => {
            for field in IMMUTABLE_FIELDS {
                map.remove(*field);
            }
            Ok(Value::Object(map))
        }
        other => Err(StorageError::InvalidPatch(format!(
            "expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

/// Returns the value at a top-level field, treating `null` as absent.
pub fn field<'a>(document: &'a Value, name: &str) -> Option<&'a Value> {
    document.get(name).filter(|v| !v.is_null())
}

pub fn document_id(document: &Value) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}

/// Fails with `Duplicate` when another document in `existing` shares a value
/// for any of `unique` with `candidate`. The document whose id is `id` is
/// skipped so that a replace does not collide with itself.
pub fn check_unique<'a, I>(collection: &str, id: &str, candidate: &Value, unique: &[&str], existing: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Value>,
{
    if unique.is_empty() {
        return Ok(());
    }
    let wanted: Vec<(&str, &Value)> = unique
        .iter()
        .filter_map(|name| field(candidate, name).map(|v| (*name, v)))
        .collect();
    if wanted.is_empty() {
        return Ok(());
    }
    for other in existing {
        if document_id(other) == Some(id) {
            continue;
        }
        for (name, value) in &wanted {
            if field(other, name) == Some(*value) {
                return Err(StorageError::Duplicate {
                    collection: collection.to_string(),
                    field: name.to_string(),
                    value: display_value(value),
                });
            }
        }
    }
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
