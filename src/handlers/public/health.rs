use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::collections::COLLECTIONS;
use crate::database::manager;

/// GET / - service info
pub async fn root() -> Json<Value> {
    let collections: Vec<&str> = COLLECTIONS.iter().map(|c| c.name).collect();

    Json(json!({
        "success": true,
        "data": {
            "name": "SERGAS API",
            "version": env!("CARGO_PKG_VERSION"),
            "collections": collections,
            "endpoints": {
                "public": "GET /api/:collection, GET /api/company, POST /api/contacto, POST /api/login",
                "protected": "POST|PUT|DELETE /api/:collection[/:id], PUT /api/:collection/reorder, POST /api/company, /api/users[/:id], POST /api/upload",
            }
        }
    }))
}

/// GET /health - database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match manager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
