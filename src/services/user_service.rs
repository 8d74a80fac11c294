use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::AnyPool;

use crate::database::columns::{
    bind_fields, decode_columns, insert_sql, select_list, update_sql, writable_fields, ColumnDef,
    Field, WriteMode,
};
use crate::database::manager::{inserted_id, DatabaseError};
use crate::database::row::{id_of, row_to_json, truthy};

/// Columns a user listing may expose. `password` is never selected here.
static PUBLIC_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("email"),
    ColumnDef::text("nombre"),
    ColumnDef::text("rol"),
    ColumnDef::object("permisos"),
    ColumnDef::integer("activo"),
];

/// Columns login needs, including the password hash
static CREDENTIAL_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("email"),
    ColumnDef::text("nombre"),
    ColumnDef::text("rol"),
    ColumnDef::text("password"),
    ColumnDef::integer("activo"),
];

/// Columns an update may change
static EDITABLE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("nombre"),
    ColumnDef::text("rol"),
    ColumnDef::object("permisos"),
];

/// Stored credentials of one user, as needed by login
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub nombre: Option<String>,
    pub rol: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub activo: bool,
}

impl UserRecord {
    fn from_row(row: &Map<String, Value>) -> Option<Self> {
        let text = |key: &str| row.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            id: id_of(row)?,
            email: text("email")?,
            nombre: text("nombre"),
            rol: text("rol"),
            password_hash: text("password").unwrap_or_default(),
            activo: row.get("activo").map(truthy).unwrap_or(false),
        })
    }
}

/// A user to create; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub nombre: Option<String>,
    pub password_hash: String,
    pub rol: Option<String>,
    pub permisos: Value,
}

pub struct UserService<'a> {
    pool: &'a AnyPool,
}

impl<'a> UserService<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Every user without password hashes, `permisos` normalized to an object
    pub async fn list(&self) -> Result<Vec<Map<String, Value>>, DatabaseError> {
        let sql = format!("SELECT {} FROM `users` ORDER BY `id` ASC", select_list(PUBLIC_COLUMNS)?);
        let rows = sqlx::query(&sql).fetch_all(self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| {
                let mut user = row_to_json(row);
                decode_columns(PUBLIC_COLUMNS, &mut user);
                user
            })
            .collect())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM `users` WHERE `email` = ?",
            select_list(CREDENTIAL_COLUMNS)?
        );
        let row = sqlx::query(&sql)
            .bind(email.to_string())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|row| row_to_json(&row)).as_ref().and_then(UserRecord::from_row))
    }

    /// Insert an active user. A duplicate email is a `Conflict`.
    pub async fn create(&self, user: &NewUser) -> Result<i64, DatabaseError> {
        let permisos = ColumnDef::object("permisos").encode(&user.permisos)?;
        let fields: Vec<Field> = vec![
            ("email", Value::from(user.email.clone())),
            ("nombre", user.nombre.clone().map(Value::from).unwrap_or(Value::Null)),
            ("password", Value::from(user.password_hash.clone())),
            ("rol", user.rol.clone().map(Value::from).unwrap_or(Value::Null)),
            ("permisos", permisos),
            ("activo", Value::from(1)),
        ];

        let sql = insert_sql("users", &fields)?;
        let mut tx = self.pool.begin().await?;
        let result = bind_fields(sqlx::query(&sql), &fields)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_write(e, "user"))?;
        let id = inserted_id(&mut tx, &result, "user").await?;
        tx.commit().await?;

        Ok(id)
    }

    /// Write `nombre`, `rol` and `permisos` when supplied
    pub async fn update(&self, id: i64, payload: &Value) -> Result<(), DatabaseError> {
        let fields = writable_fields(EDITABLE_COLUMNS, payload, WriteMode::Update)?;
        let sql = update_sql("users", &fields)?;

        let result = bind_fields(sqlx::query(&sql), &fields)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM `users` WHERE `id` = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::seeded_pool;
    use serde_json::json;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            nombre: Some("Admin".to_string()),
            password_hash: "$2b$04$hash".to_string(),
            rol: Some("admin".to_string()),
            permisos: json!({"proyectos": true}),
        }
    }

    #[tokio::test]
    async fn list_hides_passwords_and_normalizes_permissions() {
        let pool = seeded_pool().await;
        let users = UserService::new(&pool);
        users.create(&new_user("a@sergas.ar")).await.unwrap();
        sqlx::query("INSERT INTO users (email, password, permisos) VALUES ('b@sergas.ar', 'x', 'roto')")
            .execute(&pool)
            .await
            .unwrap();

        let listed = users.list().await.unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|u| !u.contains_key("password")));
        assert_eq!(listed[0]["permisos"], json!({"proyectos": true}));
        assert_eq!(listed[0]["activo"], json!(1));
        assert_eq!(listed[1]["permisos"], json!({}));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let pool = seeded_pool().await;
        let users = UserService::new(&pool);
        users.create(&new_user("a@sergas.ar")).await.unwrap();

        let again = users.create(&new_user("a@sergas.ar")).await;
        assert!(matches!(again, Err(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn find_update_and_delete() {
        let pool = seeded_pool().await;
        let users = UserService::new(&pool);
        let id = users.create(&new_user("a@sergas.ar")).await.unwrap();
        assert_eq!(id, 1);

        let found = users.find_by_email("a@sergas.ar").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.password_hash, "$2b$04$hash");
        assert!(found.activo);
        assert!(users.find_by_email("nadie@sergas.ar").await.unwrap().is_none());

        // email and password are not editable through update
        users
            .update(id, &json!({"rol": "editor", "email": "otro@sergas.ar", "password": "x"}))
            .await
            .unwrap();
        let found = users.find_by_email("a@sergas.ar").await.unwrap().unwrap();
        assert_eq!(found.rol.as_deref(), Some("editor"));
        assert_eq!(found.password_hash, "$2b$04$hash");

        assert!(matches!(users.update(id, &json!({"email": "x"})).await, Err(DatabaseError::NoWritableFields)));
        assert!(matches!(users.update(999, &json!({"rol": "x"})).await, Err(DatabaseError::NotFound(_))));

        users.delete(id).await.unwrap();
        assert!(matches!(users.delete(id).await, Err(DatabaseError::NotFound(_))));
    }
}
