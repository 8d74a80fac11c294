//! Helpers for unit tests that need a live database.

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

const SCHEMA: &str = include_str!("../../tests/fixtures/schema.sql");

/// A single-connection in-memory SQLite pool.
///
/// One connection only: every new SQLite memory connection is a new, empty database.
pub async fn memory_pool() -> AnyPool {
    sqlx::any::install_default_drivers();

    AnyPoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite pool")
}

/// In-memory pool with the application tables created
pub async fn seeded_pool() -> AnyPool {
    let pool = memory_pool().await;
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("schema statement");
    }
    pool
}

/// Insert a project row with an explicit position
pub async fn insert_project(pool: &AnyPool, id: i64, titulo: &str, orden: i64) {
    sqlx::query("INSERT INTO proyectos (id, titulo, orden) VALUES (?, ?, ?)")
        .bind(id)
        .bind(titulo.to_string())
        .bind(orden)
        .execute(pool)
        .await
        .expect("insert project");
}

/// Current `(id, orden)` pairs of the projects table, by id
pub async fn project_positions(pool: &AnyPool) -> Vec<(i64, i64)> {
    let rows = sqlx::query("SELECT id, orden FROM proyectos ORDER BY id")
        .fetch_all(pool)
        .await
        .expect("select positions");
    rows.iter()
        .map(|row| {
            use sqlx::Row;
            (row.get::<i64, _>("id"), row.get::<i64, _>("orden"))
        })
        .collect()
}
