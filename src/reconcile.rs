//! Default-filling merge for persisted documents.
//!
//! Old documents pick up fields added to the schema since they were written,
//! while every value the user already set is kept.

use serde_json::{Map, Value};

/// Merge `defaults` into `loaded`, returning `true` if `loaded` changed.
///
/// * A key missing or `null` in `loaded` takes the default value.
/// * Where both sides hold objects, the merge recurses.
/// * Where the default is an object but `loaded` holds something else, the
///   default replaces it.
/// * Any other loaded value is kept as is, arrays included.
pub fn reconcile(loaded: &mut Value, defaults: &Value) -> bool {
    match (loaded, defaults) {
        (Value::Object(l), Value::Object(d)) => reconcile_object(l, d),
        (_, Value::Null) => false,
        (slot, _) if slot.is_null() => {
            *slot = defaults.clone();
            true
        }
        (slot, Value::Object(_)) => {
            *slot = defaults.clone();
            true
        }
        (_, Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_)) => false,
    }
}

fn reconcile_object(loaded: &mut Map<String, Value>, defaults: &Map<String, Value>) -> bool {
    let mut changed = false;
    for (key, default) in defaults {
        if let Some(slot) = loaded.get_mut(key).filter(|v| !v.is_null()) {
            changed |= reconcile(slot, default);
        } else if !default.is_null() {
            loaded.insert(key.clone(), default.clone());
            changed = true;
        }
    }
    changed
}
