use axum::extract::{rejection::JsonRejection, Path, State};
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::repository::CollectionRepository;
use crate::error::ApiError;
use crate::handlers::resolve_collection;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// POST /api/:collection - insert a row; without `orden` it goes last
pub async fn collection_post(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let collection = resolve_collection(&name)?;

    let id = CollectionRepository::new(collection, &state.pool)
        .insert(&payload, state.config.ordering.base_offset)
        .await?;

    Ok(ApiResponse::created(json!({ "id": id })))
}

/// PUT /api/:collection/:id - write the supplied known columns
pub async fn collection_put(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, i64)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let collection = resolve_collection(&name)?;

    CollectionRepository::new(collection, &state.pool).update(id, &payload).await?;
    Ok(ApiResponse::success(json!({ "id": id })))
}

/// DELETE /api/:collection/:id
pub async fn collection_delete(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, i64)>,
) -> ApiResult<Value> {
    let collection = resolve_collection(&name)?;

    CollectionRepository::new(collection, &state.pool).delete(id).await?;
    Ok(ApiResponse::success(json!({ "id": id })))
}

/// PUT /api/:collection/reorder
///
/// Body is `{"ids": [...], "base": n}` (`base` optional) or a bare id array.
pub async fn reorder_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(name): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let collection = resolve_collection(&name)?;
    let (ids, base) = reorder_request(payload, state.config.ordering.base_offset)?;

    tracing::info!(collection = collection.name, user = user.id, "reorder requested");
    state.reorderer.reorder(collection, &ids, base).await?;

    let count = ids.as_array().map(Vec::len).unwrap_or(0);
    Ok(ApiResponse::success(json!({ "collection": collection.name, "count": count })))
}

/// Split a reorder body into the raw ids value and the base offset
fn reorder_request(payload: Value, default_base: i64) -> Result<(Value, i64), ApiError> {
    match payload {
        Value::Object(mut body) => {
            let base = match body.get("base") {
                None | Some(Value::Null) => default_base,
                Some(value) => value
                    .as_i64()
                    .ok_or_else(|| ApiError::bad_request("base must be an integer"))?,
            };
            let ids = body.remove("ids").unwrap_or(Value::Null);
            Ok((ids, base))
        }
        // Anything else is handed to the reorderer, which rejects non-arrays
        other => Ok((other, default_base)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_object_and_bare_array_bodies() {
        let (ids, base) = reorder_request(json!({"ids": [3, 1], "base": 1}), 0).unwrap();
        assert_eq!((ids, base), (json!([3, 1]), 1));

        let (ids, base) = reorder_request(json!([2, 1]), 5).unwrap();
        assert_eq!((ids, base), (json!([2, 1]), 5));

        let (ids, _) = reorder_request(json!({"orden": [1]}), 0).unwrap();
        assert_eq!(ids, Value::Null);

        assert!(reorder_request(json!({"ids": [1], "base": "uno"}), 0).is_err());
    }
}
