//! JSON helpers shared by the context processor, the expansion engine and
//! the compaction engine.

use serde_json::{Map as JsonMap, Value};

pub(crate) use self::nullable::Nullable;

mod nullable;

/// Coerces a value to an array: wraps non-array values in a single-element
/// array, leaves arrays untouched, and treats `Null` as an empty array.
pub(crate) fn to_array(v: &Value) -> Vec<Value> {
    match v {
        Value::Null => Vec::new(),
        Value::Array(arr) => arr.clone(),
        other => vec![other.clone()],
    }
}

/// Checks whether an object is a *value object*: it carries `@value`.
///
/// See the data model invariants in the crate-level documentation: a value
/// object's only other permitted keys are `@type` (xor) `@language`.
pub(crate) fn is_value_object(obj: &JsonMap<String, Value>) -> bool {
    obj.contains_key("@value")
}

/// Checks whether an object is a *list object*: it carries `@list` and
/// nothing else.
pub(crate) fn is_list_object(v: &Value) -> bool {
    match v {
        Value::Object(obj) => obj.len() == 1 && obj.contains_key("@list"),
        _ => false,
    }
}

/// Checks whether an object is an *identifier object*: it carries `@id` and
/// no other reserved value-bearing key.
pub(crate) fn is_id_only_object(obj: &JsonMap<String, Value>) -> bool {
    obj.contains_key("@id") && obj.len() == 1
}
