//! Defensive decoding of list-valued columns.
//!
//! Columns such as `tags`, `galeria` or `categoria` changed shape over the
//! life of the database. Older rows hold a single bare value (`3` or `"3"`),
//! newer rows hold a JSON array stored as text (`"[3,5]"`), and some rows hold
//! text that never parsed. Every one of those shapes maps to a plain list here
//! and no input is an error.

use serde_json::{Map, Value};

/// Normalize a raw list-valued column.
///
/// The checks run in a fixed order and the order matters: a bare string is
/// only parsed as JSON when it opens with `[`, so a legacy `"3"` stays the
/// string `"3"` instead of becoming the number `3`.
///
/// ```
/// use serde_json::json;
/// use sergas_api::normalize::normalize_list_column;
///
/// assert_eq!(normalize_list_column(&json!("[3,5]")), vec![json!(3), json!(5)]);
/// assert_eq!(normalize_list_column(&json!("3")), vec![json!("3")]);
/// assert!(normalize_list_column(&json!("[bad json")).is_empty());
/// ```
pub fn normalize_list_column(raw: &Value) -> Vec<Value> {
    match raw {
        Value::Null => Vec::new(),
        Value::String(s) if s.is_empty() => Vec::new(),
        Value::Array(items) => items.clone(),
        Value::Number(_) => vec![raw.clone()],
        Value::String(s) if !s.starts_with('[') => vec![raw.clone()],
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        // No historical encoding produced these
        Value::Bool(_) | Value::Object(_) => Vec::new(),
    }
}

/// Encode a client-supplied list value for storage.
///
/// The value goes through [`normalize_list_column`] first, so a missing value
/// is stored as `[]`, a scalar as a one-element array and an already encoded
/// JSON string is not double-encoded.
pub fn encode_list_column(value: Option<&Value>) -> String {
    let items = value.map(normalize_list_column).unwrap_or_default();
    Value::Array(items).to_string()
}

/// Normalize a raw object-valued column (e.g. `users.permisos`).
///
/// Anything that is not, or does not parse to, a JSON object becomes `{}`.
pub fn normalize_object_column(raw: &Value) -> Value {
    match raw {
        Value::Object(_) => raw.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed @ Value::Object(_)) => parsed,
            _ => Value::Object(Map::new()),
        },
        _ => Value::Object(Map::new()),
    }
}
