use serde_json::{Map, Value};
use sqlx::AnyPool;
use sqlx::Row;
use tracing::info;

use crate::database::columns::{
    bind_fields, decode_columns, insert_sql, select_list, update_sql, writable_fields, ColumnDef,
    WriteMode,
};
use crate::database::manager::{inserted_id, DatabaseError};
use crate::database::row::row_to_json;

static COMPANY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("nombre"),
    ColumnDef::text("slogan"),
    ColumnDef::text("descripcion"),
    ColumnDef::text("email"),
    ColumnDef::text("telefono"),
    ColumnDef::text("whatsapp"),
    ColumnDef::text("direccion"),
    ColumnDef::text("horario"),
    ColumnDef::text("mapa_url"),
    ColumnDef::object("redes"),
];

/// The single `company_data` row shown in the site header and footer
pub struct CompanyService<'a> {
    pool: &'a AnyPool,
}

impl<'a> CompanyService<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<Option<Map<String, Value>>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM `company_data` ORDER BY `id` ASC LIMIT 1",
            select_list(COMPANY_COLUMNS)?
        );
        let row = sqlx::query(&sql).fetch_optional(self.pool).await?;

        Ok(row.map(|row| {
            let mut company = row_to_json(&row);
            decode_columns(COMPANY_COLUMNS, &mut company);
            company
        }))
    }

    /// Update the existing row or insert the first one. Returns its id.
    pub async fn upsert(&self, payload: &Value) -> Result<i64, DatabaseError> {
        let fields = writable_fields(COMPANY_COLUMNS, payload, WriteMode::Update)?;

        let mut tx = self.pool.begin().await?;
        let existing = sqlx::query(
            "SELECT CAST(`id` AS SIGNED) AS `id` FROM `company_data` ORDER BY `id` ASC LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?;

        let id = match existing {
            Some(row) => {
                let id: i64 = row.try_get("id")?;
                let sql = update_sql("company_data", &fields)?;
                bind_fields(sqlx::query(&sql), &fields).bind(id).execute(&mut *tx).await?;
                id
            }
            None => {
                let sql = insert_sql("company_data", &fields)?;
                let result = bind_fields(sqlx::query(&sql), &fields).execute(&mut *tx).await?;
                inserted_id(&mut tx, &result, "company").await?
            }
        };

        tx.commit().await?;
        info!("company data saved (id {})", id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::seeded_pool;
    use serde_json::json;

    #[tokio::test]
    async fn upsert_inserts_once_then_updates() {
        let pool = seeded_pool().await;
        let company = CompanyService::new(&pool);
        assert!(company.get().await.unwrap().is_none());

        let first = company
            .upsert(&json!({"nombre": "SERGAS", "redes": {"instagram": "@sergas"}}))
            .await
            .unwrap();
        let second = company.upsert(&json!({"slogan": "Obras y servicios"})).await.unwrap();
        assert_eq!((first, second), (1, 1));

        let row = company.get().await.unwrap().unwrap();
        assert_eq!(row["nombre"], json!("SERGAS"));
        assert_eq!(row["slogan"], json!("Obras y servicios"));
        assert_eq!(row["redes"], json!({"instagram": "@sergas"}));

        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM company_data")
            .fetch_one(&pool)
            .await
            .unwrap()
            .get("n");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn empty_payload_writes_nothing() {
        let pool = seeded_pool().await;
        let result = CompanyService::new(&pool).upsert(&json!({"desconocido": 1})).await;
        assert!(matches!(result, Err(DatabaseError::NoWritableFields)));
    }
}
