//! Answer map helpers.

use serde_json::Value;

/// Answers keyed by field name; nested containers and repeaters store
/// objects and arrays of objects.
pub type AnswerMap = serde_json::Map<String, Value>;

/// Returns `true` for a missing answer, `null`, an empty string or an
/// empty array.
pub fn is_empty_answer(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Turns `slot` into an object if it is anything else and returns it.
pub(crate) fn object_slot(slot: &mut Value) -> &mut AnswerMap {
    if !slot.is_object() {
        *slot = Value::Object(AnswerMap::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced by an object"),
    }
}

/// Turns `slot` into an array if it is anything else and returns it.
pub(crate) fn array_slot(slot: &mut Value) -> &mut Vec<Value> {
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => items,
        _ => unreachable!("slot was just replaced by an array"),
    }
}
