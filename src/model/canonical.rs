//! Removal of commented-out keys.
//!
//! Authors disable a property without deleting it by prefixing its key with
//! an ASCII underscore (`"_onLoad": ...`). Every document tree is filtered
//! before rules see it.

use serde_json::Value;

/// Returns true if the key is disabled by the underscore convention.
///
/// Only a literal ASCII `_` counts; look-alikes such as `＿` (U+FF3F) do not.
pub fn is_commented_key(key: &str) -> bool {
    key.as_bytes().first() == Some(&b'_')
}

/// Return the tree with every commented-out key removed at any depth.
pub fn filter_commented_keys(mut value: Value) -> Value {
    filter_commented_keys_in_place(&mut value);
    value
}

/// Remove commented-out keys in place.
///
/// Maps nested in list elements are filtered too; scalars and strings in
/// lists are left untouched. A map emptied by filtering stays in its parent.
pub fn filter_commented_keys_in_place(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let disabled: Vec<String> = map
                .keys()
                .filter(|k| is_commented_key(k))
                .cloned()
                .collect();
            for key in disabled {
                map.remove(&key);
            }
            for child in map.values_mut() {
                filter_commented_keys_in_place(child);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                filter_commented_keys_in_place(item);
            }
        }
        _ => {}
    }
}
