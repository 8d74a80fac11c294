use sqlx::any::{AnyPoolOptions, AnyQueryResult};
use sqlx::{AnyConnection, AnyPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("No writable fields in payload")]
    NoWritableFields,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Driver reported no id for the inserted {0}")]
    MissingInsertId(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Translate unique-key violations into `Conflict`, pass everything else through.
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Conflict(format!("{} already exists", what))
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Build the process-wide connection pool.
///
/// The `any` driver lets the same statements run against MySQL in
/// deployments and SQLite in tests.
pub async fn connect(config: &DatabaseConfig) -> Result<AnyPool, DatabaseError> {
    sqlx::any::install_default_drivers();

    let url = config.connection_url()?;
    let pool = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connection_timeout())
        .connect(&url)
        .await?;

    info!("Created database pool (max {} connections)", config.max_connections);
    Ok(pool)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &AnyPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Id of the row the last INSERT on `conn` created.
///
/// The SQLite `any` driver leaves `last_insert_id` empty, so the id is read
/// back on the same connection with the backend's own function. Call it
/// before the surrounding transaction commits.
pub async fn inserted_id(
    conn: &mut AnyConnection,
    result: &AnyQueryResult,
    what: &'static str,
) -> Result<i64, DatabaseError> {
    if let Some(id) = result.last_insert_id().filter(|id| *id > 0) {
        return Ok(id);
    }

    let sql = if conn.backend_name().eq_ignore_ascii_case("mysql") {
        "SELECT CAST(LAST_INSERT_ID() AS SIGNED)"
    } else {
        "SELECT last_insert_rowid()"
    };
    let id: i64 = sqlx::query_scalar(sql).fetch_one(&mut *conn).await?;

    if id > 0 {
        Ok(id)
    } else {
        Err(DatabaseError::MissingInsertId(what))
    }
}

/// Quote a SQL identifier. Backticks are understood by both MySQL and SQLite.
pub fn quote_identifier(name: &str) -> Result<String, DatabaseError> {
    if !is_valid_identifier(name) {
        return Err(DatabaseError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("`{}`", name))
}

/// Table and column names are fixed in the registry; accept only [a-zA-Z_][a-zA-Z0-9_]*
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
