use axum::extract::{Path, State};
use serde_json::{Map, Value};

use crate::app::AppState;
use crate::database::repository::CollectionRepository;
use crate::handlers::resolve_collection;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::CompanyService;

/// GET /api/:collection - rows in display order, list columns normalized
pub async fn collection_get(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Vec<Map<String, Value>>> {
    let collection = resolve_collection(&name)?;
    let rows = CollectionRepository::new(collection, &state.pool).select_all().await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/company - the company row, or `null` before it is first saved
pub async fn company_get(State(state): State<AppState>) -> ApiResult<Option<Map<String, Value>>> {
    let company = CompanyService::new(&state.pool).get().await?;
    Ok(ApiResponse::success(company))
}
