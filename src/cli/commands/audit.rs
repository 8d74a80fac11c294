use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::cli::{utils, OutputFormat};
use crate::database::collections::Collection;
use crate::database::columns::ColumnKind;
use crate::database::repository::CollectionRepository;
use crate::database::row::id_of;
use crate::normalize::normalize_list_column;

/// A stored list value the website reads back as `[]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegradedCell {
    pub id: Option<i64>,
    pub column: &'static str,
    pub raw: Value,
}

pub async fn handle(collection: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let collection = utils::resolve_collection(collection)?;
    let (_, pool) = utils::connect_from_env().await?;

    let rows = CollectionRepository::new(collection, &pool).select_raw().await?;
    let degraded = find_degraded(collection, &rows);

    match output_format {
        OutputFormat::Json => utils::output_success(
            output_format,
            &format!("Audited {} rows of {}", rows.len(), collection.name),
            Some(json!({ "rows": rows.len(), "degraded": degraded })),
        ),
        OutputFormat::Text => {
            for cell in &degraded {
                let id = cell.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string());
                println!("{} #{} {}: {}", collection.name, id, cell.column, cell.raw);
            }
            println!(
                "{} of {} rows have unreadable list columns",
                degraded.iter().filter_map(|c| c.id).collect::<std::collections::BTreeSet<_>>().len(),
                rows.len()
            );
            Ok(())
        }
    }
}

/// List cells that hold something yet normalize to an empty list
pub fn find_degraded(collection: &Collection, rows: &[Map<String, Value>]) -> Vec<DegradedCell> {
    let list_columns = collection.columns.iter().filter(|c| c.kind == ColumnKind::List);

    let mut degraded = Vec::new();
    for column in list_columns {
        for row in rows {
            let Some(raw) = row.get(column.name) else { continue };
            if is_blank(raw) {
                continue;
            }
            if normalize_list_column(raw).is_empty() {
                degraded.push(DegradedCell {
                    id: id_of(row),
                    column: column.name,
                    raw: raw.clone(),
                });
            }
        }
    }
    degraded.sort_by_key(|cell| cell.id);
    degraded
}

fn is_blank(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty() || s.trim() == "[]",
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
