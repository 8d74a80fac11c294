use serde_json::{Map, Value};
use sqlx::AnyPool;
use sqlx::Row;

use crate::database::collections::Collection;
use crate::database::columns::{
    bind_fields, decode_columns, insert_sql, select_list, update_sql, writable_fields, WriteMode,
};
use crate::database::manager::{inserted_id, quote_identifier, DatabaseError};
use crate::database::row::row_to_json;
use crate::normalize::{numeric_ids, normalize_list_column, resolve_slugs, SlugLookup};

/// CRUD over one orderable collection
pub struct CollectionRepository<'a> {
    collection: &'static Collection,
    pool: &'a AnyPool,
}

impl<'a> CollectionRepository<'a> {
    pub fn new(collection: &'static Collection, pool: &'a AnyPool) -> Self {
        Self { collection, pool }
    }

    /// Rows in display order exactly as stored
    pub async fn select_raw(&self) -> Result<Vec<Map<String, Value>>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} {}, `id` ASC",
            select_list(self.collection.columns)?,
            quote_identifier(self.collection.table)?,
            quote_identifier(self.collection.position_column)?,
            self.collection.sort.to_sql(),
        );
        let rows = sqlx::query(&sql).fetch_all(self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Rows in display order with list columns normalized and slugs resolved
    pub async fn select_all(&self) -> Result<Vec<Map<String, Value>>, DatabaseError> {
        let mut rows = self.select_raw().await?;

        let lookup = match &self.collection.slugs {
            Some(source) => Some(self.slug_lookup(source.table, source.slug_column).await?),
            None => None,
        };

        for row in rows.iter_mut() {
            if let (Some(source), Some(lookup)) = (&self.collection.slugs, &lookup) {
                let ids = row
                    .get(source.column)
                    .map(|raw| numeric_ids(&normalize_list_column(raw)))
                    .unwrap_or_default();
                let slugs = resolve_slugs(&ids, lookup);
                row.insert(source.target.to_string(), Value::from(slugs));
            }
            decode_columns(self.collection.columns, row);
        }

        Ok(rows)
    }

    async fn slug_lookup(&self, table: &str, slug_column: &str) -> Result<SlugLookup, DatabaseError> {
        let sql = format!(
            "SELECT CAST(`id` AS SIGNED) AS `id`, CAST({} AS CHAR) AS slug FROM {}",
            quote_identifier(slug_column)?,
            quote_identifier(table)?
        );
        let rows = sqlx::query(&sql).fetch_all(self.pool).await?;

        let mut lookup = SlugLookup::new();
        for row in rows.iter() {
            let id: i64 = row.try_get("id")?;
            let slug: Option<String> = row.try_get("slug")?;
            if let Some(slug) = slug.filter(|s| !s.is_empty()) {
                lookup.insert(id, slug);
            }
        }
        Ok(lookup)
    }

    /// Insert a row; without an explicit position it goes last.
    pub async fn insert(&self, payload: &Value, base_offset: i64) -> Result<i64, DatabaseError> {
        let mut fields = writable_fields(self.collection.columns, payload, WriteMode::Insert)?;
        let position_column = self.collection.position_column;

        let mut tx = self.pool.begin().await?;

        let has_position = fields
            .iter()
            .any(|(name, value)| *name == position_column && !value.is_null());
        if !has_position {
            fields.retain(|(name, _)| *name != position_column);
            let sql = format!(
                "SELECT CAST(MAX({}) AS SIGNED) AS max_position FROM {}",
                quote_identifier(position_column)?,
                quote_identifier(self.collection.table)?
            );
            let row = sqlx::query(&sql).fetch_one(&mut *tx).await?;
            let max: Option<i64> = row.try_get("max_position")?;
            let next = match max {
                Some(m) => m.checked_add(1).ok_or_else(|| {
                    DatabaseError::InvalidPayload(format!("no position left after {}", m))
                })?,
                None => base_offset,
            };
            fields.push((position_column, Value::from(next)));
        }

        let sql = insert_sql(self.collection.table, &fields)?;
        let result = bind_fields(sqlx::query(&sql), &fields)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_write(e, self.collection.name))?;
        let id = inserted_id(&mut tx, &result, self.collection.name).await?;
        tx.commit().await?;

        Ok(id)
    }

    /// Write the supplied known columns of one row
    pub async fn update(&self, id: i64, payload: &Value) -> Result<(), DatabaseError> {
        let fields = writable_fields(self.collection.columns, payload, WriteMode::Update)?;
        let sql = update_sql(self.collection.table, &fields)?;

        let result = bind_fields(sqlx::query(&sql), &fields)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, self.collection.name))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "{} {} not found",
                self.collection.name, id
            )));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE `id` = ?", quote_identifier(self.collection.table)?);
        let result = sqlx::query(&sql).bind(id).execute(self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "{} {} not found",
                self.collection.name, id
            )));
        }
        Ok(())
    }
}
