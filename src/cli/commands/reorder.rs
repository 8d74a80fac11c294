use serde_json::{json, Value};

use crate::cli::{utils, OutputFormat};
use crate::ordering::Reorderer;

pub async fn handle(
    collection: &str,
    ids: Vec<i64>,
    base: Option<i64>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let collection = utils::resolve_collection(collection)?;
    let (config, pool) = utils::connect_from_env().await?;
    let base = base.unwrap_or(config.ordering.base_offset);

    let reorderer = Reorderer::new(pool, &config.ordering);
    reorderer.reorder(collection, &Value::from(ids.clone()), base).await?;

    utils::output_success(
        output_format,
        &format!("Reordered {} rows of {}", ids.len(), collection.name),
        Some(json!({ "collection": collection.name, "ids": ids, "base": base })),
    )
}
