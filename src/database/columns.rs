//! Typed column sets and the SQL built from them.
//!
//! Every table the API writes to is described by a static list of
//! [`ColumnDef`]s. Only those columns are ever read or written, which keeps
//! client payloads from reaching arbitrary columns and lets list/object
//! columns be encoded and normalized in one place.

use serde_json::{Map, Value};
use sqlx::any::{Any, AnyArguments};
use sqlx::query::Query;

use crate::database::manager::{quote_identifier, DatabaseError};
use crate::database::row::bind_value;
use crate::normalize::{encode_list_column, normalize_list_column, normalize_object_column};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    /// List stored as JSON text, see [`normalize_list_column`]
    List,
    /// Object stored as JSON text, see [`normalize_object_column`]
    Object,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl ColumnDef {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Text }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Integer }
    }

    pub const fn list(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::List }
    }

    pub const fn object(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Object }
    }

    /// Convert a client value into the value stored for this column
    pub fn encode(&self, value: &Value) -> Result<Value, DatabaseError> {
        match self.kind {
            ColumnKind::Text => Ok(match value {
                Value::Null | Value::String(_) => value.clone(),
                other => Value::String(other.to_string()),
            }),
            ColumnKind::Integer => match value {
                Value::Null => Ok(Value::Null),
                Value::Bool(b) => Ok(Value::from(*b as i64)),
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| self.not_an_integer()),
                _ => Err(self.not_an_integer()),
            },
            ColumnKind::List => Ok(Value::String(encode_list_column(Some(value)))),
            ColumnKind::Object => Ok(Value::String(normalize_object_column(value).to_string())),
        }
    }

    fn not_an_integer(&self) -> DatabaseError {
        DatabaseError::InvalidPayload(format!("'{}' must be an integer", self.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Absent list columns are stored as `[]`
    Insert,
    /// Only supplied columns are written
    Update,
}

/// A column name with its encoded value
pub type Field = (&'static str, Value);

/// Pick the known columns out of a JSON object payload and encode them.
/// Unknown keys are ignored.
pub fn writable_fields(
    columns: &'static [ColumnDef],
    payload: &Value,
    mode: WriteMode,
) -> Result<Vec<Field>, DatabaseError> {
    let object = payload
        .as_object()
        .ok_or_else(|| DatabaseError::InvalidPayload("expected a JSON object".to_string()))?;

    let mut fields = Vec::new();
    for column in columns {
        match object.get(column.name) {
            Some(value) => fields.push((column.name, column.encode(value)?)),
            None if mode == WriteMode::Insert && column.kind == ColumnKind::List => {
                fields.push((column.name, Value::String(encode_list_column(None))));
            }
            None => {}
        }
    }
    Ok(fields)
}

/// Normalize list and object columns of a decoded row in place
pub fn decode_columns(columns: &[ColumnDef], row: &mut Map<String, Value>) {
    for column in columns {
        let Some(raw) = row.get(column.name) else { continue };
        let decoded = match column.kind {
            ColumnKind::List => Value::Array(normalize_list_column(raw)),
            ColumnKind::Object => normalize_object_column(raw),
            ColumnKind::Text | ColumnKind::Integer => continue,
        };
        row.insert(column.name.to_string(), decoded);
    }
}

/// SELECT list of `id` plus `columns`.
///
/// Every column is cast to a signed integer or to character data. The MySQL
/// `any` mapping rejects `TINYINT` and reports `TEXT` as a blob; SQLite
/// keeps the stored value either way.
pub fn select_list(columns: &[ColumnDef]) -> Result<String, DatabaseError> {
    let mut exprs = vec![select_expr(&ColumnDef::integer("id"))?];
    for column in columns {
        exprs.push(select_expr(column)?);
    }
    Ok(exprs.join(", "))
}

fn select_expr(column: &ColumnDef) -> Result<String, DatabaseError> {
    let quoted = quote_identifier(column.name)?;
    let target = match column.kind {
        ColumnKind::Integer => "SIGNED",
        ColumnKind::Text | ColumnKind::List | ColumnKind::Object => "CHAR",
    };
    Ok(format!("CAST({0} AS {1}) AS {0}", quoted, target))
}

pub fn insert_sql(table: &str, fields: &[Field]) -> Result<String, DatabaseError> {
    if fields.is_empty() {
        return Err(DatabaseError::NoWritableFields);
    }
    let names = fields
        .iter()
        .map(|(name, _)| quote_identifier(name))
        .collect::<Result<Vec<_>, _>>()?;
    let placeholders = vec!["?"; fields.len()].join(", ");
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table)?,
        names.join(", "),
        placeholders
    ))
}

/// UPDATE by primary key; the id is bound after the fields
pub fn update_sql(table: &str, fields: &[Field]) -> Result<String, DatabaseError> {
    if fields.is_empty() {
        return Err(DatabaseError::NoWritableFields);
    }
    let assignments = fields
        .iter()
        .map(|(name, _)| quote_identifier(name).map(|quoted| format!("{} = ?", quoted)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!(
        "UPDATE {} SET {} WHERE `id` = ?",
        quote_identifier(table)?,
        assignments.join(", ")
    ))
}

pub fn bind_fields<'q>(
    mut q: Query<'q, Any, AnyArguments<'q>>,
    fields: &[Field],
) -> Query<'q, Any, AnyArguments<'q>> {
    for (_, value) in fields {
        q = bind_value(q, value);
    }
    q
}
