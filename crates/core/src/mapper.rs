//! Entity mapper
//!
//! Turns decoded JSON into [`Entity`] values. Elements that are not
//! non-empty objects are skipped, which keeps batch responses with
//! partial failures (`null` slots) usable.

use para_domain::{Entity, Pager, ParaError, Result};
use serde_json::Value;

use crate::pagination::apply_envelope;
use crate::response::Payload;

/// Flat copy of a JSON object into an entity; other values yield `None`
pub fn to_entity(value: &Value) -> Option<Entity> {
    value.as_object().map(|fields| Entity::from_fields(fields.clone()))
}

/// Entities for every non-empty object in `items`
pub fn entities_from_array(items: &[Value]) -> Vec<Entity> {
    items
        .iter()
        .filter_map(Value::as_object)
        .filter(|fields| !fields.is_empty())
        .map(|fields| Entity::from_fields(fields.clone()))
        .collect()
}

/// Entities listed under `results_field` of a list envelope
///
/// When `pager` is given, `totalHits` and `lastKey` are copied into it.
/// A missing envelope or results field yields an empty list.
pub fn to_entity_list(envelope: &Value, results_field: &str, pager: Option<&mut Pager>) -> Vec<Entity> {
    let Some(items) = envelope.get(results_field) else {
        return Vec::new();
    };
    if let Some(pager) = pager {
        apply_envelope(envelope, pager);
    }
    items.as_array().map(|items| entities_from_array(items)).unwrap_or_default()
}

/// Single entity from a response payload
///
/// # Errors
/// Returns `ParaError::Decode` for a non-JSON body or a JSON value that is
/// not an object.
pub fn entity_from_payload(payload: Payload) -> Result<Option<Entity>> {
    match payload {
        Payload::Empty => Ok(None),
        Payload::Json(Value::Null) => Ok(None),
        Payload::Json(value) => to_entity(&value)
            .map(Some)
            .ok_or_else(|| ParaError::Decode(format!("Expected a JSON object, got {}", kind(&value)))),
        Payload::Text(body) => Err(not_json(&body)),
    }
}

/// Entity list from a bare JSON array payload, as returned by batch calls
///
/// # Errors
/// Returns `ParaError::Decode` for a non-JSON body or a non-array value.
pub fn entities_from_payload(payload: Payload) -> Result<Vec<Entity>> {
    match payload {
        Payload::Empty | Payload::Json(Value::Null) => Ok(Vec::new()),
        Payload::Json(Value::Array(items)) => Ok(entities_from_array(&items)),
        Payload::Json(value) => {
            Err(ParaError::Decode(format!("Expected a JSON array, got {}", kind(&value))))
        }
        Payload::Text(body) => Err(not_json(&body)),
    }
}

/// Entity list from a `{items, totalHits, lastKey}` envelope payload
///
/// # Errors
/// Returns `ParaError::Decode` for a non-JSON body.
pub fn entity_list_from_payload(
    payload: Payload,
    results_field: &str,
    pager: Option<&mut Pager>,
) -> Result<Vec<Entity>> {
    match payload {
        Payload::Empty => Ok(Vec::new()),
        Payload::Json(envelope) => Ok(to_entity_list(&envelope, results_field, pager)),
        Payload::Text(body) => Err(not_json(&body)),
    }
}

fn not_json(body: &str) -> ParaError {
    let preview: String = body.chars().take(64).collect();
    ParaError::Decode(format!("Response body is not JSON: {preview}"))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
