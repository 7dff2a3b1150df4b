use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Shape of a form field in a schema-driven editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Array(Box<FieldKind>),
    Object(BTreeMap<String, FieldKind>),
}

impl FieldKind {
    /// Check that `value` has this shape. Object fields missing from `value`
    /// or set to null are accepted; unknown keys are rejected.
    pub fn validate(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldKind::String, Value::String(_)) => true,
            (FieldKind::Number, Value::Number(_)) => true,
            (FieldKind::Boolean, Value::Bool(_)) => true,
            (FieldKind::Array(item), Value::Array(items)) => {
                items.iter().all(|v| item.validate(v))
            }
            (FieldKind::Object(fields), Value::Object(map)) => {
                map.iter().all(|(key, v)| match fields.get(key) {
                    Some(kind) => v.is_null() || kind.validate(v),
                    None => false,
                })
            }
            _ => false,
        }
    }
}
