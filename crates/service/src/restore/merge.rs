//! Recursive merge of JSON objects.

use serde_json::{Map, Value};

/// Merge `incoming` on top of `existing`, field by field.
///
/// For every field of `incoming`: when both sides hold an object the two are
/// merged recursively, otherwise the incoming value replaces the existing one
/// outright (arrays included). Fields only present in `existing` are kept.
pub fn deep_merge(existing: &Map<String, Value>, incoming: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = existing.clone();
    merge_into(&mut merged, incoming);
    merged
}

fn merge_into(target: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (field, value) in incoming {
        if let Value::Object(next) = value {
            if let Some(Value::Object(current)) = target.get_mut(field) {
                merge_into(current, next);
                continue;
            }
        }
        target.insert(field.clone(), value.clone());
    }
}
