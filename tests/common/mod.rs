#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use sergas_api::app::{self, AppState};
use sergas_api::auth::hash_password;
use sergas_api::config::AppConfig;
use sergas_api::database::manager::inserted_id;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tempfile::TempDir;

const SCHEMA: &str = include_str!("../fixtures/schema.sql");

pub const ADMIN_EMAIL: &str = "admin@sergas.ar";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// An in-process server on its own port with a fresh in-memory database
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub pool: AnyPool,
    pub state: AppState,
    pub upload_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let pool = seeded_pool().await?;
        let upload_dir = tempfile::tempdir()?;

        let mut config = AppConfig::development();
        config.uploads.directory = upload_dir.path().to_string_lossy().into_owned();
        config.uploads.public_base_url = "https://sergas.ar/uploads".to_string();
        config.uploads.max_bytes = 1024 * 1024;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::build(config, pool.clone())?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let router = app::router(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            pool,
            state,
            upload_dir,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Insert a user with a bcrypt hash of `password`
    pub async fn seed_user(&self, email: &str, password: &str, activo: bool) -> Result<i64> {
        let hash = hash_password(password, 4, Duration::from_secs(10)).await?;
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("INSERT INTO users (email, nombre, password, rol, permisos, activo) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(email.to_string())
            .bind("Admin".to_string())
            .bind(hash)
            .bind("admin".to_string())
            .bind("{}".to_string())
            .bind(activo as i64)
            .execute(&mut *conn)
            .await?;
        Ok(inserted_id(&mut conn, &result, "user").await?)
    }

    /// A valid token for a seeded admin
    pub async fn admin_token(&self) -> Result<String> {
        let id = self.seed_user(ADMIN_EMAIL, ADMIN_PASSWORD, true).await?;
        Ok(self.state.jwt.issue(id, ADMIN_EMAIL, Some("admin"))?)
    }
}

async fn seeded_pool() -> Result<AnyPool> {
    sqlx::any::install_default_drivers();

    // One connection only: every SQLite memory connection is its own database
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(&pool).await?;
    }
    Ok(pool)
}
