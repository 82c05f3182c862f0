//! JSON merge-patch (RFC 7396).

use serde_json::{Map, Value};

/// Apply `patch` to `target` in place.
///
/// - an object patch merges member by member, recursively
/// - a `null` member removes the member from the target
/// - any other patch replaces the target entirely
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(members) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(existing) = target {
        for (name, value) in members {
            if value.is_null() {
                existing.remove(name);
            } else {
                merge_patch(existing.entry(name.clone()).or_insert(Value::Null), value);
            }
        }
    }
}
