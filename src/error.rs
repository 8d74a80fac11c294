// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::AuthError;
use crate::database::manager::DatabaseError;
use crate::ordering::ReorderError;
use crate::storage::UploadError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (media store issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError { field_errors: Some(field_errors), .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert module errors to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Conflict(msg) => ApiError::conflict(msg),
            DatabaseError::InvalidPayload(msg) => ApiError::bad_request(msg),
            DatabaseError::NoWritableFields => {
                ApiError::bad_request("Request body contains no writable fields")
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => {
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<ReorderError> for ApiError {
    fn from(err: ReorderError) -> Self {
        match err {
            ReorderError::InvalidArgument(msg) => ApiError::validation_error(msg, None),
            ReorderError::UnknownId(id) => ApiError::not_found(format!("No row with id {}", id)),
            ReorderError::InvalidCollection(name) => {
                ApiError::not_found(format!("Unknown collection '{}'", name))
            }
            ReorderError::Persistence(e) => {
                tracing::error!("Reorder persistence error: {}", e);
                ApiError::internal_server_error("Failed to save the new order")
            }
            ReorderError::Timeout(after) => {
                tracing::error!("Reorder timed out after {:?}", after);
                ApiError::internal_server_error("Saving the new order timed out")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken(msg) => ApiError::unauthorized(msg),
            AuthError::InvalidToken(e) => ApiError::unauthorized(format!("Invalid JWT token: {}", e)),
            AuthError::InvalidCredentials => ApiError::unauthorized("Invalid email or password"),
            AuthError::Inactive => ApiError::forbidden("User is inactive"),
            other => {
                tracing::error!("Authentication error: {}", other);
                ApiError::internal_server_error("Authentication failed")
            }
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingFile => ApiError::validation_error(
                "Missing file",
                Some(HashMap::from([("file".to_string(), "This field is required".to_string())])),
            ),
            UploadError::TooLarge { limit } => {
                ApiError::payload_too_large(format!("File exceeds {} bytes", limit))
            }
            UploadError::Timeout(after) => {
                tracing::error!("Upload timed out after {:?}", after);
                ApiError::bad_gateway("Media store did not respond in time")
            }
            UploadError::Io(e) => {
                tracing::error!("Upload I/O error: {}", e);
                ApiError::internal_server_error("Failed to store file")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorder_errors_map_to_status_codes() {
        let cases = [
            (ReorderError::InvalidArgument("ids must be an array".into()), StatusCode::BAD_REQUEST),
            (ReorderError::UnknownId(3), StatusCode::NOT_FOUND),
            (ReorderError::Timeout(std::time::Duration::from_secs(1)), StatusCode::INTERNAL_SERVER_ERROR),
            (ReorderError::Persistence(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let err = ApiError::from(DatabaseError::Sqlx(sqlx::Error::Protocol("secret detail".into())));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_json().to_string().contains("secret detail"));
    }

    #[test]
    fn validation_errors_carry_field_errors() {
        let err = ApiError::from(UploadError::MissingFile);
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["file"], "This field is required");
    }

    #[test]
    fn upload_errors_map_to_status_codes() {
        let cases = [
            (UploadError::TooLarge { limit: 10 }, StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            (UploadError::Timeout(std::time::Duration::from_secs(1)), StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
            (
                UploadError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            let err = ApiError::from(err);
            assert_eq!(err.status_code(), status);
            assert_eq!(err.to_json()["code"], code);
        }
    }

    #[test]
    fn missing_insert_ids_are_server_errors() {
        let err = ApiError::from(DatabaseError::MissingInsertId("user"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn credential_errors() {
        assert_eq!(ApiError::from(AuthError::InvalidCredentials).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::Inactive).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::from(DatabaseError::Conflict("user".into())).status_code(), StatusCode::CONFLICT);
    }
}
