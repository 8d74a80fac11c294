use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::app::AppState;
use crate::auth::hash_password;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{NewUser, UserService};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    pub nombre: Option<String>,
    #[serde(default)]
    pub password: String,
    pub rol: Option<String>,
    #[serde(default)]
    pub permisos: Value,
}

impl CreateUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();
        if self.email.trim().is_empty() {
            field_errors.insert("email".to_string(), "This field is required".to_string());
        }
        if self.password.is_empty() {
            field_errors.insert("password".to_string(), "This field is required".to_string());
        }

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Missing required fields", Some(field_errors)))
        }
    }
}

/// GET /api/users - every user, password hashes never included
pub async fn users_get(State(state): State<AppState>) -> ApiResult<Vec<Map<String, Value>>> {
    let users = UserService::new(&state.pool).list().await?;
    Ok(ApiResponse::success(users))
}

/// POST /api/users - create an active user with a bcrypt-hashed password
pub async fn users_post(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(request) = payload?;
    request.validate()?;

    let security = &state.config.security;
    let password_hash = hash_password(&request.password, security.bcrypt_cost, security.hash_timeout()).await?;

    let id = UserService::new(&state.pool)
        .create(&NewUser {
            email: request.email.trim().to_string(),
            nombre: request.nombre,
            password_hash,
            rol: request.rol,
            permisos: request.permisos,
        })
        .await?;

    tracing::info!(user = id, "user created");
    Ok(ApiResponse::created(json!({ "id": id })))
}

/// PUT /api/users/:id - update nombre, rol and permisos
pub async fn user_put(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    UserService::new(&state.pool).update(id, &payload).await?;
    Ok(ApiResponse::success(json!({ "id": id })))
}

/// DELETE /api/users/:id
pub async fn user_delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    UserService::new(&state.pool).delete(id).await?;
    tracing::info!(user = id, "user deleted");
    Ok(ApiResponse::success(json!({ "id": id })))
}
