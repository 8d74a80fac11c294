// handlers/public/login.rs - POST /api/login

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{verify_password, AuthError};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{UserRecord, UserService};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserRecord,
    pub expires_in: u64,
}

/// POST /api/login - Authenticate user and receive JWT token
///
/// Unknown email and wrong password both answer 401 with the same message.
/// Inactive users answer 403 only after the password matched.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let email = request.email.trim();

    let user = match UserService::new(&state.pool).find_by_email(email).await? {
        Some(user) => user,
        None => {
            tracing::warn!(email, "login for unknown user");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let matches = verify_password(
        &request.password,
        &user.password_hash,
        state.config.security.hash_timeout(),
    )
    .await?;
    if !matches {
        tracing::warn!(user = user.id, "login with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    if !user.activo {
        return Err(AuthError::Inactive.into());
    }

    let token = state.jwt.issue(user.id, &user.email, user.rol.as_deref())?;
    tracing::info!(user = user.id, "login succeeded");

    Ok(ApiResponse::success(LoginResponse {
        token,
        user,
        expires_in: state.config.security.jwt_expiry_hours * 3600,
    }))
}
