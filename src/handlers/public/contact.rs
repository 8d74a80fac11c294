use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{store_message, ContactMessage};

/// POST /api/contacto - store a message from the website contact form
pub async fn contacto_post(
    State(state): State<AppState>,
    payload: Result<Json<ContactMessage>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(message) = payload?;
    message
        .validate()
        .map_err(|field_errors| ApiError::validation_error("Missing required fields", Some(field_errors)))?;

    let id = store_message(&state.pool, &message).await?;
    Ok(ApiResponse::created(json!({ "id": id })))
}
