use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::CompanyService;

/// POST /api/company - create or update the single company row
pub async fn company_post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let id = CompanyService::new(&state.pool).upsert(&payload).await?;
    Ok(ApiResponse::success(json!({ "id": id })))
}
