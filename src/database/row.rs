//! Conversion between `AnyRow`s and JSON maps.

use serde_json::{Map, Number, Value};
use sqlx::any::{Any, AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Column, Row, ValueRef};

/// Decode every column of a row into a JSON value.
///
/// The `any` driver erases column types, so decoding tries the supported
/// scalar types in turn. Undecodable columns become `null`.
pub fn row_to_json(row: &AnyRow) -> Map<String, Value> {
    let mut map = Map::new();

    for (i, column) in row.columns().iter().enumerate() {
        let is_null = row.try_get_raw(i).map(|raw| raw.is_null()).unwrap_or(true);

        let value = if is_null {
            Value::Null
        } else if let Ok(v) = row.try_get::<i64, _>(i) {
            Value::Number(v.into())
        } else if let Ok(v) = row.try_get::<f64, _>(i) {
            Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<String, _>(i) {
            Value::String(v)
        } else if let Ok(v) = row.try_get::<bool, _>(i) {
            Value::Bool(v)
        } else if let Ok(v) = row.try_get::<Vec<u8>, _>(i) {
            Value::String(String::from_utf8_lossy(&v).into_owned())
        } else {
            Value::Null
        };

        map.insert(column.name().to_string(), value);
    }

    map
}

/// Bind a JSON value as a statement parameter.
///
/// Arrays and objects are bound as their JSON text.
pub fn bind_value<'q>(q: Query<'q, Any, AnyArguments<'q>>, v: &Value) -> Query<'q, Any, AnyArguments<'q>> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

/// Read an integer id out of a decoded row
pub fn id_of(map: &Map<String, Value>) -> Option<i64> {
    map.get("id").and_then(Value::as_i64)
}

/// Interpret a stored flag (TINYINT, BOOLEAN or text) as a boolean
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim(), "1" | "true" | "TRUE"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthy_flags() {
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!("1")));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&json!("no")));
    }

    #[tokio::test]
    async fn decodes_mixed_columns() {
        let pool = crate::testing::memory_pool().await;
        let row = sqlx::query("SELECT 7 AS id, 'hola' AS titulo, 2.5 AS ratio, NULL AS tags")
            .fetch_one(&pool)
            .await
            .unwrap();

        let map = row_to_json(&row);
        assert_eq!(map.get("id"), Some(&json!(7)));
        assert_eq!(map.get("titulo"), Some(&json!("hola")));
        assert_eq!(map.get("ratio"), Some(&json!(2.5)));
        assert_eq!(map.get("tags"), Some(&Value::Null));
        assert_eq!(id_of(&map), Some(7));
    }

    #[tokio::test]
    async fn binds_json_values() {
        let pool = crate::testing::memory_pool().await;
        let q = sqlx::query("SELECT ? AS a, ? AS b, ? AS c");
        let q = bind_value(q, &json!(42));
        let q = bind_value(q, &json!("texto"));
        let q = bind_value(q, &json!([1, 2]));
        let row = q.fetch_one(&pool).await.unwrap();

        let map = row_to_json(&row);
        assert_eq!(map.get("a"), Some(&json!(42)));
        assert_eq!(map.get("b"), Some(&json!("texto")));
        assert_eq!(map.get("c"), Some(&json!("[1,2]")));
    }
}
