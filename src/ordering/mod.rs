//! Batch rewrite of a collection's position column.
//!
//! Given ids in their desired display order, every row gets
//! `position = base_offset + index`. All updates of one batch run in a single
//! transaction on a single pooled connection: either every position changes
//! or none does.

pub mod error;
pub mod locks;

pub use error::ReorderError;
pub use locks::CollectionLocks;

use serde_json::Value;
use sqlx::any::Any;
use sqlx::AnyPool;
use sqlx::Transaction;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::OrderingConfig;
use crate::database::collections::Collection;
use crate::database::manager::quote_identifier;

#[derive(Clone)]
pub struct Reorderer {
    pool: AnyPool,
    locks: CollectionLocks,
    timeout: Duration,
    strict: bool,
}

impl Reorderer {
    pub fn new(pool: AnyPool, config: &OrderingConfig) -> Self {
        Self {
            pool,
            locks: CollectionLocks::new(),
            timeout: config.timeout(),
            strict: config.strict,
        }
    }

    /// Rewrite positions of `collection` so that they follow `ids`.
    ///
    /// `ids` is the raw request value; anything but an array of integer ids
    /// is rejected with [`ReorderError::InvalidArgument`] before any write.
    /// Ids that match no row are skipped unless the reorderer is strict.
    pub async fn reorder(
        &self,
        collection: &Collection,
        ids: &Value,
        base_offset: i64,
    ) -> Result<(), ReorderError> {
        let ids = parse_ids(ids)?;
        if ids.is_empty() {
            debug!(collection = collection.name, "empty reorder, nothing to do");
            return Ok(());
        }
        ensure_positions_fit(base_offset, ids.len())?;

        let lock = self.locks.lock_for(collection.name).await;
        let _guard = lock.lock().await;

        match tokio::time::timeout(self.timeout, self.apply(collection, &ids, base_offset)).await {
            Ok(result) => result,
            Err(_) => {
                // The dropped transaction rolls back when its connection is returned
                warn!(collection = collection.name, "reorder timed out after {:?}", self.timeout);
                Err(ReorderError::Timeout(self.timeout))
            }
        }
    }

    async fn apply(&self, collection: &Collection, ids: &[i64], base_offset: i64) -> Result<(), ReorderError> {
        let sql = format!(
            "UPDATE {} SET {} = ? WHERE `id` = ?",
            quote_identifier(collection.table)?,
            quote_identifier(collection.position_column)?
        );

        let mut tx = self.pool.begin().await?;
        let mut matched = 0u64;

        for (index, id) in ids.iter().enumerate() {
            let position = base_offset + index as i64;
            let result = sqlx::query(&sql).bind(position).bind(*id).execute(&mut *tx).await;

            let rows = match result {
                Ok(done) => done.rows_affected(),
                Err(e) => {
                    rollback(tx, collection).await;
                    return Err(ReorderError::Persistence(e));
                }
            };

            if rows == 0 {
                if self.strict {
                    rollback(tx, collection).await;
                    return Err(ReorderError::UnknownId(*id));
                }
                debug!(collection = collection.name, id, "reorder id matched no row");
            }
            matched += rows;
        }

        tx.commit().await?;
        info!(
            collection = collection.name,
            requested = ids.len(),
            matched,
            "reorder committed"
        );
        Ok(())
    }
}

async fn rollback(tx: Transaction<'static, Any>, collection: &Collection) {
    if let Err(e) = tx.rollback().await {
        warn!(collection = collection.name, "rollback failed: {}", e);
    } else {
        warn!(collection = collection.name, "reorder rolled back");
    }
}

/// `base_offset + len - 1` must still be an `i64`
fn ensure_positions_fit(base_offset: i64, len: usize) -> Result<(), ReorderError> {
    i64::try_from(len.saturating_sub(1))
        .ok()
        .and_then(|offset| base_offset.checked_add(offset))
        .map(|_| ())
        .ok_or_else(|| {
            ReorderError::InvalidArgument(format!(
                "base {} leaves no room for {} positions",
                base_offset, len
            ))
        })
}

/// Validate the untyped `ids` value of a reorder request.
///
/// Accepts an array of integers or integer strings.
pub fn parse_ids(value: &Value) -> Result<Vec<i64>, ReorderError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Err(ReorderError::InvalidArgument("ids is required".to_string())),
        other => {
            return Err(ReorderError::InvalidArgument(format!(
                "ids must be an array, got {}",
                json_kind(other)
            )))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let id = match item {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            id.ok_or_else(|| {
                ReorderError::InvalidArgument(format!("ids[{}] is not an integer id: {}", index, item))
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
