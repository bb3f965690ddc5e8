use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notelink_core::{IndexError, PathError, ScanError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Index(#[from] IndexError),

    /// A refresh failed; the previous snapshot is still being served.
    #[error("refresh failed: {0}")]
    Refresh(#[from] ScanError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Index(_) | ApiError::Refresh(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Path(PathError::Invalid(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Path(PathError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::Path(PathError::NotFound(_)) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the client may retry the same request later.
    pub fn retryable(&self) -> bool {
        self.status() == StatusCode::SERVICE_UNAVAILABLE
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Request failed with {}: {}", status, self);
        }

        let body = if self.retryable() {
            json!({ "error": self.to_string(), "retryable": true })
        } else {
            json!({ "error": self.to_string() })
        };
        (status, Json(body)).into_response()
    }
}
