use anyhow::Context;
use serde_json::{json, Value};
use sqlx::AnyPool;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::collections::{self, Collection};
use crate::database::manager;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Load `.env` and the environment configuration, then connect
pub async fn connect_from_env() -> anyhow::Result<(AppConfig, AnyPool)> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env();
    let pool = manager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    Ok((config, pool))
}

pub fn resolve_collection(name: &str) -> anyhow::Result<&'static Collection> {
    collections::find(name).ok_or_else(|| {
        let known: Vec<&str> = collections::COLLECTIONS.iter().map(|c| c.name).collect();
        anyhow::anyhow!("Collection '{}' not found (known: {})", name, known.join(", "))
    })
}
