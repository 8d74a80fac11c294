use serde_json::json;

use crate::auth::hash_password;
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;

pub async fn handle(password: &str, cost: Option<u32>, output_format: OutputFormat) -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let security = AppConfig::from_env().security;
    let cost = cost.unwrap_or(security.bcrypt_cost);

    let hash = hash_password(password, cost, security.hash_timeout()).await?;

    match output_format {
        OutputFormat::Json => utils::output_success(
            output_format,
            "Password hashed",
            Some(json!({ "hash": hash, "cost": cost })),
        ),
        OutputFormat::Text => {
            println!("{}", hash);
            Ok(())
        }
    }
}
