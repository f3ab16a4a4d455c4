//! Flattening of nested documents into dotted-key rows

use crate::types::{Document, FlatRecord, JsonValue};

/// Separator placed between a parent key and its child key
pub const KEY_SEPARATOR: char = '.';

/// Flatten a document.
///
/// Object-valued fields are expanded transitively into `parent.child`
/// keys. Arrays and scalars are copied unchanged, and an empty nested
/// object contributes no keys. The input is left untouched.
pub fn flatten(document: &Document) -> FlatRecord {
    let mut record = FlatRecord::new();
    flatten_into(document, None, &mut record);
    record
}

fn flatten_into(object: &Document, prefix: Option<&str>, record: &mut FlatRecord) {
    for (key, value) in object {
        let path = match prefix {
            Some(prefix) => format!("{prefix}{KEY_SEPARATOR}{key}"),
            None => key.clone(),
        };

        match value {
            JsonValue::Object(nested) => flatten_into(nested, Some(&path), record),
            other => {
                record.insert(path, other.clone());
            }
        }
    }
}
