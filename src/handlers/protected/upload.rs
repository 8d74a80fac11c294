use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::storage::{store_upload, UploadError};

/// POST /api/upload - multipart field `file`, answers with the public URL
pub async fn upload_post(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Value> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("file").to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let url = store_upload(state.media.as_ref(), &state.config.uploads, &original_name, &bytes).await?;
        return Ok(ApiResponse::success(json!({ "url": url })));
    }

    Err(UploadError::MissingFile.into())
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}
