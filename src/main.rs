use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sergas_api::app::{self, AppState};
use sergas_api::config::AppConfig;
use sergas_api::database::manager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DB_HOST, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting SERGAS API in {:?} mode", config.environment);

    let pool = manager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    let port = config.api.port;
    let state = AppState::build(config, pool).context("invalid security configuration")?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("SERGAS API listening on http://{}", bind_addr);
    axum::serve(listener, app::router(state)).await?;
    Ok(())
}
