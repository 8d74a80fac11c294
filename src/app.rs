//! Application state and router assembly.

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use sqlx::AnyPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{AuthError, JwtKeys};
use crate::config::{AppConfig, SecurityConfig};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::ordering::Reorderer;
use crate::storage::{LocalMediaStore, MediaStore};

/// Everything a handler needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: AnyPool,
    pub reorderer: Reorderer,
    pub jwt: Arc<JwtKeys>,
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    /// State with the filesystem media store from `config.uploads`
    pub fn build(config: AppConfig, pool: AnyPool) -> Result<Self, AuthError> {
        let media = Arc::new(LocalMediaStore::from_config(&config.uploads));
        Self::with_media(config, pool, media)
    }

    pub fn with_media(
        config: AppConfig,
        pool: AnyPool,
        media: Arc<dyn MediaStore>,
    ) -> Result<Self, AuthError> {
        let jwt = JwtKeys::from_config(&config.security)?;
        let reorderer = Reorderer::new(pool.clone(), &config.ordering);

        Ok(Self {
            config: Arc::new(config),
            pool,
            reorderer,
            jwt: Arc::new(jwt),
            media,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let request_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(request_limit)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(public::login_post))
        .route("/api/contacto", post(public::contacto_post))
        .route("/api/company", get(public::company_get))
        .route("/api/:collection", get(public::collection_get))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    // Multipart bodies may exceed the JSON limit; the upload handler enforces its own cap
    let upload_limit = state.config.uploads.max_bytes + 64 * 1024;

    Router::new()
        .route("/api/company", post(protected::company_post))
        .route("/api/users", get(protected::users_get).post(protected::users_post))
        .route(
            "/api/users/:id",
            put(protected::user_put).delete(protected::user_delete),
        )
        .route(
            "/api/upload",
            post(protected::upload_post).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/:collection", post(protected::collection_post))
        .route("/api/:collection/reorder", put(protected::reorder_put))
        .route(
            "/api/:collection/:id",
            put(protected::collection_put).delete(protected::collection_delete),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
